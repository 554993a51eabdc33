//! Canonical column names and the header mapping of the source file

pub const CROP: &str = "crop";
pub const CROP_CATEGORY: &str = "crop_category";
pub const REGION: &str = "region";
pub const ADMINISTRATIVE_LEVEL: &str = "administrative_level";
pub const PARENT_REGION: &str = "parent_region";
pub const YEAR: &str = "year";
pub const SOWN_AREA_KHA: &str = "sown_area_kha";
pub const YIELD_10KT: &str = "yield_10kt";
pub const YIELD_PER_HA: &str = "yield_per_ha";
pub const AVG_PRICE_YUAN_PER_TON: &str = "avg_price_yuan_per_ton";
pub const DATA_SOURCE: &str = "data_source";
pub const COLLECTED_AT: &str = "collected_at";

/// Localized source headers and the canonical name each one maps to.
pub const HEADER_ALIASES: &[(&str, &str)] = &[
    ("作物", CROP),
    ("作物类别", CROP_CATEGORY),
    ("地区", REGION),
    ("行政级别", ADMINISTRATIVE_LEVEL),
    ("上级地区", PARENT_REGION),
    ("年份", YEAR),
    ("播种面积(千公顷)", SOWN_AREA_KHA),
    ("产量(万吨)", YIELD_10KT),
    ("单产(吨/公顷)", YIELD_PER_HA),
    ("平均价格(元/吨)", AVG_PRICE_YUAN_PER_TON),
    ("数据来源", DATA_SOURCE),
    ("采集日期", COLLECTED_AT),
];

/// Columns coerced with the parse-or-null rule.
pub const NUMERIC_COLUMNS: &[&str] = &[
    YEAR,
    SOWN_AREA_KHA,
    YIELD_10KT,
    YIELD_PER_HA,
    AVG_PRICE_YUAN_PER_TON,
];

/// A cleaned row must carry a value in every one of these.
pub const REQUIRED_COLUMNS: &[&str] = &[
    CROP,
    REGION,
    YEAR,
    SOWN_AREA_KHA,
    AVG_PRICE_YUAN_PER_TON,
    YIELD_10KT,
];

pub const CATEGORICAL_FEATURES: &[&str] = &[CROP, REGION];
pub const NUMERIC_FEATURES: &[&str] = &[YEAR, SOWN_AREA_KHA, AVG_PRICE_YUAN_PER_TON];
pub const TARGET_COLUMN: &str = YIELD_10KT;

/// Rows dated before this year are discarded.
pub const MIN_YEAR: i64 = 1900;

/// Resolve a raw header to its canonical column name.
///
/// Canonical headers resolve to themselves; anything else returns `None` and is kept
/// under its original name.
pub fn canonical_name(header: &str) -> Option<&'static str> {
    let header = header.trim_start_matches('\u{feff}').trim();
    HEADER_ALIASES
        .iter()
        .find(|(alias, canonical)| *alias == header || *canonical == header)
        .map(|(_, canonical)| *canonical)
}

/// Feature columns in the order the model consumes them.
pub fn feature_columns() -> impl Iterator<Item = &'static str> {
    CATEGORICAL_FEATURES.iter().chain(NUMERIC_FEATURES.iter()).copied()
}
