/// Pulls ingredient tokens out of a product display name. Korean OTC names
/// embed the active ingredients in parentheses, e.g.
/// "타이레놀정500밀리그람(아세트아미노펜)"; groups are split on commas,
/// middle dots and whitespace runs. Order is kept and duplicates across
/// groups are preserved; deduplication is the caller's concern.
pub fn extract_ingredients(item_name: &str) -> Vec<String> {
    let mut ingredients = Vec::new();
    let mut rest = item_name;

    while let Some((_, after_open)) = rest.split_once('(') {
        let Some((group, tail)) = after_open.split_once(')') else {
            break;
        };
        ingredients.extend(split_group(group));
        rest = tail;
    }

    ingredients
}

fn split_group(group: &str) -> impl Iterator<Item = String> + '_ {
    group
        .split(|c: char| c == ',' || c == '·' || c.is_whitespace())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_parenthesized_group_means_no_ingredients() {
        assert!(extract_ingredients("타이레놀정500밀리그람").is_empty());
        assert!(extract_ingredients("").is_empty());
    }

    #[test]
    fn single_group_single_ingredient() {
        assert_eq!(
            extract_ingredients("타이레놀정500밀리그람(아세트아미노펜)"),
            vec!["아세트아미노펜"]
        );
    }

    #[test]
    fn group_splits_on_comma_middle_dot_and_whitespace() {
        assert_eq!(
            extract_ingredients("게보린정(아세트아미노펜,이소프로필안티피린·카페인무수물)"),
            vec!["아세트아미노펜", "이소프로필안티피린", "카페인무수물"]
        );
        assert_eq!(
            extract_ingredients("복합제(성분가 성분나)"),
            vec!["성분가", "성분나"]
        );
    }

    #[test]
    fn multiple_groups_preserve_order_and_duplicates() {
        assert_eq!(
            extract_ingredients("이중정(아세트아미노펜)(아세트아미노펜·카페인무수물)"),
            vec!["아세트아미노펜", "아세트아미노펜", "카페인무수물"]
        );
    }

    #[test]
    fn unbalanced_or_empty_groups_are_harmless() {
        assert!(extract_ingredients("미완성(아세트아미노").is_empty());
        assert!(extract_ingredients("공백만( , )").is_empty());
        assert!(extract_ingredients("빈괄호()").is_empty());
    }
}
