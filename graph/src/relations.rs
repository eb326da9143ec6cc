use std::collections::BTreeSet;

use zog_zotero::Item;

/// A directed `(source, target)` pair of item keys.
pub type Relationship = (String, String);

/// One relationship per related URI of every item, in item order.
///
/// Items without a `dc:relation` predicate relate to themselves so they still show up in the
/// graph. An item whose predicate carries no URIs contributes nothing.
pub fn create_relationships(items: &[Item]) -> Vec<Relationship> {
    let mut relationships = Vec::new();

    for item in items {
        let key = &item.data.key;
        let Some(related) = item.data.relations.related() else {
            relationships.push((key.clone(), key.clone()));
            continue;
        };

        relationships.extend(
            related
                .iter()
                .map(|uri| (key.clone(), last_path_segment(uri).to_string())),
        );
    }

    relationships
}

/// Every key that appears on either side of a relationship.
pub fn extract_nodes(relationships: &[Relationship]) -> BTreeSet<String> {
    relationships
        .iter()
        .flat_map(|(source, target)| [source.clone(), target.clone()])
        .collect()
}

/// `http://zotero.org/users/1/items/ABCD1234` -> `ABCD1234`.
pub fn last_path_segment(uri: &str) -> &str {
    let trimmed = uri.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use serde_json::json;
    use zog_zotero::models::ItemData;
    use zog_zotero::models::Relations;

    fn relations(value: Value) -> Relations {
        serde_json::from_value(value).expect("decode relations")
    }

    fn item(key: &str, relations: Relations) -> Item {
        Item {
            key: key.to_string(),
            data: ItemData {
                key: key.to_string(),
                item_type: Some("journalArticle".to_string()),
                title: None,
                url: None,
                relations,
            },
        }
    }

    fn pair(source: &str, target: &str) -> Relationship {
        (source.to_string(), target.to_string())
    }

    #[test]
    fn unrelated_item_relates_to_itself() {
        let items = [item("AAAA0001", Relations::default())];
        assert_eq!(
            create_relationships(&items),
            vec![pair("AAAA0001", "AAAA0001")]
        );
    }

    #[test]
    fn related_uris_become_edges_in_order() {
        let items = [item(
            "AAAA0001",
            relations(json!({
                "dc:relation": [
                    "http://zotero.org/users/7/items/BBBB0002",
                    "http://zotero.org/groups/9/items/CCCC0003"
                ]
            })),
        )];

        assert_eq!(
            create_relationships(&items),
            vec![pair("AAAA0001", "BBBB0002"), pair("AAAA0001", "CCCC0003")]
        );
    }

    #[test]
    fn other_predicates_do_not_count_as_related() {
        let items = [item(
            "AAAA0001",
            relations(json!({ "owl:sameAs": "http://zotero.org/groups/9/items/ZZZZ0009" })),
        )];

        assert_eq!(
            create_relationships(&items),
            vec![pair("AAAA0001", "AAAA0001")]
        );
    }

    #[test]
    fn empty_relation_list_contributes_nothing() {
        let items = [item("AAAA0001", relations(json!({ "dc:relation": [] })))];
        assert_eq!(create_relationships(&items), Vec::<Relationship>::new());
    }

    #[test]
    fn nodes_are_unique_and_sorted() {
        let relationships = vec![
            pair("CCCC0003", "AAAA0001"),
            pair("AAAA0001", "CCCC0003"),
            pair("BBBB0002", "BBBB0002"),
        ];

        assert_eq!(
            extract_nodes(&relationships).into_iter().collect::<Vec<_>>(),
            vec!["AAAA0001", "BBBB0002", "CCCC0003"]
        );
    }

    #[test]
    fn last_segment_ignores_trailing_slash() {
        assert_eq!(
            last_path_segment("http://zotero.org/users/1/items/ABCD1234/"),
            "ABCD1234"
        );
        assert_eq!(last_path_segment("ABCD1234"), "ABCD1234");
    }
}
