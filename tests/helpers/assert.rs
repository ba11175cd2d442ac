use snapbox::{Assert, Substitutions};
use time::{macros::format_description, OffsetDateTime};

/// Assert that includes [TODAY] substitution, the default end date.
pub fn assert() -> Assert {
    let mut substitutions = Substitutions::default();
    let date_format = format_description!("[year]-[month]-[day]");
    substitutions
        .insert(
            "[TODAY]",
            OffsetDateTime::now_utc().format(date_format).unwrap(),
        )
        .unwrap();
    Assert::new()
        .substitutions(substitutions)
        .action_env("SNAPSHOTS")
}
