use violation_types::{ViolationDatabase, ViolationItem};

/// Position of an item inside the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRef {
    pub category: usize,
    pub item: usize,
}

/// Match key: all spaces removed, lower-cased. "HTA 107 8 A" → "hta1078a".
pub fn normalize_code(code: &str) -> String {
    code.replace(' ', "").to_lowercase()
}

/// First item, in category then item order, whose `violationCode`,
/// `canadaEnforcement.code` or `canadaEnforcement.section` normalizes to the
/// same key as `code`. First match wins; later candidates are never looked at.
pub fn find_match(db: &ViolationDatabase, code: &str) -> Option<ItemRef> {
    let key = normalize_code(code);
    db.categories
        .iter()
        .enumerate()
        .find_map(|(category, cat)| {
            cat.items
                .iter()
                .position(|item| item_matches(item, &key))
                .map(|item| ItemRef { category, item })
        })
}

fn item_matches(item: &ViolationItem, key: &str) -> bool {
    if item
        .violation_code
        .as_deref()
        .is_some_and(|code| normalize_code(code) == key)
    {
        return true;
    }
    let Some(enforcement) = &item.canada_enforcement else {
        return false;
    };
    [enforcement.code.as_deref(), enforcement.section.as_deref()]
        .into_iter()
        .flatten()
        .filter(|c| !c.is_empty())
        .any(|c| normalize_code(c) == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use violation_types::{CanadaEnforcement, ViolationCategory};

    fn item(id: &str, code: &str) -> ViolationItem {
        ViolationItem {
            id: id.to_string(),
            violation_code: Some(code.to_string()),
            ..ViolationItem::default()
        }
    }

    fn enforced(id: &str, code: Option<&str>, section: Option<&str>) -> ViolationItem {
        ViolationItem {
            canada_enforcement: Some(CanadaEnforcement {
                code: code.map(str::to_string),
                section: section.map(str::to_string),
                ..CanadaEnforcement::default()
            }),
            ..item(id, "392.2")
        }
    }

    fn db(categories: Vec<(&str, Vec<ViolationItem>)>) -> ViolationDatabase {
        ViolationDatabase {
            categories: categories
                .into_iter()
                .map(|(key, items)| ViolationCategory {
                    items,
                    ..ViolationCategory::new(key, key)
                })
                .collect(),
            ..ViolationDatabase::default()
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("HTA 107 8 A"), "hta1078a");
        assert_eq!(normalize_code("hta1078A"), "hta1078a");
    }

    #[test]
    fn test_matches_violation_code_ignoring_spaces_and_case() {
        let db = db(vec![("a", vec![item("x", "hta 1078a")])]);
        assert_eq!(
            find_match(&db, "HTA 107 8 A"),
            Some(ItemRef { category: 0, item: 0 })
        );
    }

    #[test]
    fn test_matches_enforcement_code_and_section() {
        let db = db(vec![
            ("a", vec![enforced("x", Some("CCC 249 1"), None)]),
            ("b", vec![enforced("y", None, Some("HTA 128"))]),
        ]);
        assert_eq!(
            find_match(&db, "CCC 249 1"),
            Some(ItemRef { category: 0, item: 0 })
        );
        assert_eq!(
            find_match(&db, "HTA 128"),
            Some(ItemRef { category: 1, item: 0 })
        );
        assert_eq!(find_match(&db, "HTA 129"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let db = db(vec![
            ("a", vec![item("x", "392.2"), item("y", "HTA 128")]),
            ("b", vec![item("z", "HTA 128")]),
        ]);
        assert_eq!(
            find_match(&db, "HTA 128"),
            Some(ItemRef { category: 0, item: 1 })
        );
    }
}
