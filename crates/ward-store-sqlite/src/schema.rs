//! SQL schema for the Ward SQLite store.
//!
//! Executed once when a session opens. Column names must stay in step with
//! [`ward_core::table::Table::columns`].

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

-- All four tables are append-only.
-- The loaders never issue UPDATE or DELETE against them.
CREATE TABLE IF NOT EXISTS facilities (
    facility_id   TEXT PRIMARY KEY,
    facility_name TEXT
);

CREATE TABLE IF NOT EXISTS facility_locations (
    facility_id      TEXT PRIMARY KEY REFERENCES facilities(facility_id),
    state            TEXT,
    address          TEXT,
    city             TEXT,
    zip              TEXT,
    fips_code        TEXT,
    geocoded_address TEXT                -- 'POINT (lon lat)'
);

-- Measures compare as integers, so -0.4 truncates to 0 and passes.
CREATE TABLE IF NOT EXISTS bed_capacity_snapshots (
    facility_id     TEXT NOT NULL REFERENCES facilities(facility_id),
    collection_week TEXT NOT NULL,       -- YYYY-MM-DD
    all_adult_hospital_beds_7_day_avg                        REAL
        CHECK (CAST(all_adult_hospital_beds_7_day_avg AS INTEGER) >= 0),
    all_pediatric_inpatient_beds_7_day_avg                   REAL
        CHECK (CAST(all_pediatric_inpatient_beds_7_day_avg AS INTEGER) >= 0),
    all_adult_hospital_inpatient_bed_occupied_7_day_coverage REAL
        CHECK (CAST(all_adult_hospital_inpatient_bed_occupied_7_day_coverage AS INTEGER) >= 0),
    all_pediatric_inpatient_bed_occupied_7_day_avg           REAL
        CHECK (CAST(all_pediatric_inpatient_bed_occupied_7_day_avg AS INTEGER) >= 0),
    total_icu_beds_7_day_avg                                 REAL
        CHECK (CAST(total_icu_beds_7_day_avg AS INTEGER) >= 0),
    icu_beds_used_7_day_avg                                  REAL
        CHECK (CAST(icu_beds_used_7_day_avg AS INTEGER) >= 0),
    inpatient_beds_used_covid_7_day_avg                      REAL
        CHECK (CAST(inpatient_beds_used_covid_7_day_avg AS INTEGER) >= 0),
    staffed_icu_adult_patients_confirmed_covid_7_day_avg     REAL
        CHECK (CAST(staffed_icu_adult_patients_confirmed_covid_7_day_avg AS INTEGER) >= 0),
    PRIMARY KEY (facility_id, collection_week)
);

CREATE TABLE IF NOT EXISTS quality_ratings (
    facility_id        TEXT NOT NULL REFERENCES facilities(facility_id),
    rated_on           TEXT NOT NULL,    -- YYYY-MM-DD
    hospital_type      TEXT,
    ownership          TEXT,
    emergency_services INTEGER,          -- 0 | 1 | NULL
    overall_rating     REAL,
    PRIMARY KEY (facility_id, rated_on)
);

CREATE INDEX IF NOT EXISTS snapshots_week_idx ON bed_capacity_snapshots(collection_week);
CREATE INDEX IF NOT EXISTS ratings_date_idx   ON quality_ratings(rated_on);

PRAGMA user_version = 1;
";
