//! Update classification with lenient version coercion
//!
//! Managers report versions in several shapes (`1.2.3`, `v2`, `^1.4`,
//! `>=3.0.0-beta.1`). Classification only needs the numeric
//! `major.minor.patch` triple, so versions are coerced to the first run of
//! up to three dot-separated numbers before comparison.

use crate::domain::UpdateClass;
use regex::Regex;
use semver::Version;
use std::sync::LazyLock;

static COERCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:\.(\d+))?(?:\.(\d+))?").unwrap());

/// Coerce a loosely formatted version into `major.minor.patch`.
///
/// Missing components are 0. Returns `None` when no number is present.
pub fn coerce(version: &str) -> Option<Version> {
    let caps = COERCE_RE.captures(version)?;
    let component = |index: usize| -> Option<u64> {
        match caps.get(index) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    Some(Version::new(component(1)?, component(2)?, component(3)?))
}

fn tier(from: &Version, to: &Version) -> Option<UpdateClass> {
    if to.major > from.major {
        Some(UpdateClass::Major)
    } else if to.minor > from.minor {
        Some(UpdateClass::Minor)
    } else if to.patch > from.patch {
        Some(UpdateClass::Patch)
    } else {
        None
    }
}

/// Classify an available update from the reported versions.
///
/// The move to `wanted` decides first. When `wanted` brings nothing new the
/// jump to `latest` is classified instead. Anything that cannot be coerced
/// is treated as a major update, and an update that cannot be placed in a
/// tier falls back to patch.
pub fn classify(current: &str, wanted: &str, latest: &str) -> UpdateClass {
    let (Some(current), Some(wanted)) = (coerce(current), coerce(wanted)) else {
        return UpdateClass::Major;
    };

    if let Some(class) = tier(&current, &wanted) {
        return class;
    }

    match coerce(latest) {
        Some(latest) if latest > current => {
            tier(&current, &latest).unwrap_or(UpdateClass::Patch)
        }
        _ => UpdateClass::Patch,
    }
}

/// Returns true if moving from `current` to `target` crosses a major version.
///
/// Versions that cannot be coerced count as a major upgrade.
pub fn is_major_upgrade(current: &str, target: &str) -> bool {
    match (coerce(current), coerce(target)) {
        (Some(current), Some(target)) => target.major > current.major,
        _ => true,
    }
}
