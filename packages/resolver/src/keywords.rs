//! Label keyword tables.
//!
//! These lists encode tie-breaking observed against real statistical
//! tables. Order and weights matter: change them as data, with a test
//! against the table that motivated the change.
//!
//! All entries are in [`city_compare_label::normalize_label`] form
//! (ASCII digits, `~` for ranges, no whitespace).

/// Axis labels meaning "region".
pub const AREA_LABELS: &[&str] = &["地域"];

/// More specific region-type axis labels.
pub const AREA_TYPE_LABELS: &[&str] = &["市区町村", "都道府県", "全国", "市町村"];

/// How many items to sample when looking for municipal suffixes.
pub const AREA_ITEM_SAMPLE: usize = 20;

/// Time axis labels.
pub const TIME_LABELS: &[&str] = &["時間軸", "時点", "年次", "年度", "調査年"];

/// Labels that mark an axis as carrying age bands.
pub const AGE_AXIS_LABELS: &[&str] = &["年齢", "階級"];

/// Exact "total" labels and their scores.
pub const TOTAL_EXACT: &[(&str, i32)] = &[
    ("総数", 100),
    ("総人口", 95),
    ("男女計", 90),
    ("合計", 80),
    ("計", 80),
];

/// Substring fallback for "total".
pub const TOTAL_SUBSTRING: (&str, i32) = ("総数", 70);

/// Exact labels for the 0–14 sub-population (besides the numeric range
/// pattern, which scores 100).
pub const TARGET_EXACT: &[(&str, i32)] = &[("15歳未満", 95)];

/// Substring labels for the 0–14 sub-population.
pub const TARGET_SUBSTRING: &[(&str, i32)] = &[("年少人口", 90)];

/// Score for an exact `0~14歳` style range label.
pub const TARGET_RANGE_EXACT_SCORE: i32 = 100;

/// Score for a label merely containing a `0~14` range.
pub const TARGET_RANGE_SUBSTRING_SCORE: i32 = 70;

/// Labels that represent an unfiltered aggregate on an unrelated axis,
/// in preference order.
pub const AGGREGATE_EXACT: &[(&str, i32)] = &[
    ("総数", 100),
    ("男女計", 95),
    ("実数", 90),
    ("総計", 85),
    ("合計", 80),
    ("計", 75),
];

/// Substring fallback for aggregates.
pub const AGGREGATE_SUBSTRING: (&str, i32) = ("総数", 60);

/// Markers meaning the value is already a per-capita ratio. Longer,
/// more specific markers first.
pub const RATIO_MARKERS: &[&str] = &[
    "人口千人当たり",
    "人口1万人当たり",
    "人口10万人当たり",
    "千人当たり",
    "万人当たり",
    "当たり",
    "あたり",
    "割合",
    "率",
];

/// Bonus added to a keyword hit when the label is a ratio. Larger than
/// the spread of keyword weights so a ratio always outranks a raw count.
pub const RATIO_BONUS: i32 = 50;
