//! Demo candidates for the front end.
//!
//! The showcase record is TOI-700 d; the pool is a fixed sample of TESS
//! candidates the UI can draw from at random.

use rand::Rng;

use crate::logic::layout::FEATURE_COUNT;
use crate::models::{DemoCandidate, DemoSample, FeatureRecord};

/// First dataset row of the pool, for display
const POOL_FIRST_ROW: usize = 71;

/// TOI-700 d, Earth-sized and in its star's habitable zone
pub fn demo_candidate() -> DemoCandidate {
    DemoCandidate {
        name: "TOI-700 d (TESS Confirmed Planet)",
        mission: "TESS",
        description: "Earth-sized planet in the habitable zone of its star",
        features: FeatureRecord {
            koi_period: 37.4242,
            koi_time0bk: 1570.0,
            koi_impact: 0.34,
            koi_duration: 3.65,
            koi_depth: 287.5,
            koi_prad: 1.19,
            koi_teq: 268.8,
            koi_insol: 0.867,
            koi_model_snr: 42.3,
            koi_tce_plnt_num: 3.0,
            koi_steff: 3480.0,
            koi_slogg: 4.95,
            koi_srad: 0.415,
            ra: 103.0886,
            dec: -65.1436,
            koi_kepmag: 9.75,
            koi_fpflag_nt: 0,
            koi_fpflag_ss: 0,
            koi_fpflag_co: 0,
            koi_fpflag_ec: 0,
        },
    }
}

/// Rows in layout order; flags stored as 0.0 / 1.0
static TESS_POOL: [[f64; FEATURE_COUNT]; 21] = [
    [37.426, 1570.0, 0.234, 3.68, 144.0, 1.19, 269.0, 0.867, 52.3, 1.0, 3480.0, 4.95, 0.415, 102.196, -65.468, 9.8, 0.0, 0.0, 0.0, 0.0],
    [3.689, 1450.2, 0.12, 2.4, 890.0, 2.65, 1350.0, 185.0, 78.5, 1.0, 5500.0, 4.45, 0.98, 45.234, 12.567, 11.2, 0.0, 0.0, 0.0, 0.0],
    [5.66, 1520.8, 0.45, 1.89, 320.0, 2.42, 525.0, 12.8, 45.2, 2.0, 3386.0, 4.89, 0.38, 158.974, -51.933, 12.4, 0.0, 0.0, 0.0, 0.0],
    [24.246, 1605.5, 0.28, 4.2, 425.0, 3.45, 330.0, 1.95, 62.8, 1.0, 3250.0, 4.92, 0.46, 178.456, -66.223, 10.5, 0.0, 0.0, 0.0, 0.0],
    [16.056, 1490.3, 0.34, 3.1, 780.0, 2.98, 890.0, 48.5, 58.9, 1.0, 6180.0, 4.12, 1.56, 203.567, 18.445, 9.3, 0.0, 0.0, 0.0, 0.0],
    [8.138, 1472.6, 0.19, 2.95, 567.0, 1.87, 745.0, 28.4, 68.3, 1.0, 4890.0, 4.62, 0.78, 67.892, -34.156, 10.7, 0.0, 0.0, 0.0, 0.0],
    [42.189, 1588.9, 0.41, 5.12, 298.0, 2.14, 412.0, 3.67, 41.7, 1.0, 5670.0, 4.38, 1.12, 189.234, 23.678, 11.8, 0.0, 0.0, 0.0, 0.0],
    [11.437, 1501.4, 0.22, 3.45, 634.0, 2.31, 658.0, 19.8, 55.6, 2.0, 5230.0, 4.51, 0.89, 124.567, -12.345, 10.2, 0.0, 0.0, 0.0, 0.0],
    [6.724, 1467.8, 0.15, 2.18, 423.0, 1.65, 892.0, 42.3, 72.1, 1.0, 5890.0, 4.29, 1.05, 234.789, 45.123, 9.9, 0.0, 0.0, 0.0, 0.0],
    [28.934, 1576.2, 0.38, 4.67, 189.0, 1.42, 356.0, 2.14, 48.9, 1.0, 4120.0, 4.78, 0.61, 312.456, -56.789, 11.4, 0.0, 0.0, 0.0, 0.0],
    [14.892, 1512.7, 0.29, 3.78, 712.0, 2.78, 589.0, 15.6, 63.4, 1.0, 5450.0, 4.42, 0.95, 89.123, 8.456, 10.6, 0.0, 0.0, 0.0, 0.0],
    [4.523, 1458.3, 0.08, 1.89, 956.0, 3.12, 1120.0, 98.7, 84.2, 1.0, 6230.0, 4.18, 1.34, 156.789, -28.901, 9.5, 0.0, 0.0, 0.0, 0.0],
    [19.678, 1534.1, 0.33, 4.12, 534.0, 2.45, 478.0, 8.9, 51.8, 2.0, 4780.0, 4.68, 0.72, 267.345, 34.567, 11.1, 0.0, 0.0, 0.0, 0.0],
    [9.234, 1485.6, 0.17, 2.87, 689.0, 2.23, 723.0, 32.4, 69.5, 1.0, 5340.0, 4.48, 0.91, 198.234, -7.890, 10.3, 0.0, 0.0, 0.0, 0.0],
    [32.567, 1592.8, 0.42, 4.95, 267.0, 1.78, 389.0, 2.89, 44.3, 1.0, 4450.0, 4.72, 0.68, 78.901, -41.234, 11.6, 0.0, 0.0, 0.0, 0.0],
    [7.891, 1478.9, 0.21, 2.67, 812.0, 2.89, 812.0, 38.6, 74.8, 1.0, 5780.0, 4.35, 1.02, 145.678, 19.345, 9.7, 0.0, 0.0, 0.0, 0.0],
    [13.456, 1508.4, 0.26, 3.56, 478.0, 2.01, 612.0, 17.3, 58.7, 2.0, 5120.0, 4.55, 0.86, 289.456, -15.678, 10.9, 0.0, 0.0, 0.0, 0.0],
    [5.123, 1461.7, 0.11, 2.03, 734.0, 2.56, 998.0, 67.8, 79.2, 1.0, 5920.0, 4.26, 1.08, 223.789, 52.123, 9.8, 0.0, 0.0, 0.0, 0.0],
    [21.789, 1548.3, 0.35, 4.34, 356.0, 1.92, 445.0, 6.7, 49.6, 1.0, 4890.0, 4.64, 0.75, 112.345, -22.567, 11.3, 0.0, 0.0, 0.0, 0.0],
    [10.234, 1493.6, 0.19, 3.12, 623.0, 2.34, 689.0, 24.5, 66.4, 1.0, 5450.0, 4.44, 0.93, 178.901, 6.789, 10.4, 0.0, 0.0, 0.0, 0.0],
    [27.345, 1571.9, 0.39, 4.78, 212.0, 1.56, 367.0, 2.45, 46.2, 1.0, 4230.0, 4.75, 0.64, 301.234, -48.901, 11.7, 0.0, 0.0, 0.0, 0.0],
];

fn record_from_row(row: &[f64; FEATURE_COUNT]) -> FeatureRecord {
    FeatureRecord {
        koi_period: row[0],
        koi_time0bk: row[1],
        koi_impact: row[2],
        koi_duration: row[3],
        koi_depth: row[4],
        koi_prad: row[5],
        koi_teq: row[6],
        koi_insol: row[7],
        koi_model_snr: row[8],
        koi_tce_plnt_num: row[9],
        koi_steff: row[10],
        koi_slogg: row[11],
        koi_srad: row[12],
        ra: row[13],
        dec: row[14],
        koi_kepmag: row[15],
        koi_fpflag_nt: row[16] as i64,
        koi_fpflag_ss: row[17] as i64,
        koi_fpflag_co: row[18] as i64,
        koi_fpflag_ec: row[19] as i64,
    }
}

pub fn pool_len() -> usize {
    TESS_POOL.len()
}

/// Pool entry at `index`
pub fn pool_entry(index: usize) -> Option<DemoSample> {
    TESS_POOL.get(index).map(|row| DemoSample {
        success: true,
        data: record_from_row(row),
        row_number: POOL_FIRST_ROW + index,
    })
}

/// Uniformly random pool entry
pub fn random_sample<R: Rng + ?Sized>(rng: &mut R) -> Option<DemoSample> {
    pool_entry(rng.gen_range(0..pool_len()))
}
