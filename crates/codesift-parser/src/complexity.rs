use tree_sitter::Node;

/// Cyclomatic complexity from a parsed tree: `1 + count(decision points)`.
pub fn cyclomatic_complexity(root: &Node) -> f32 {
    1.0 + count_decision_points(root) as f32
}

fn count_decision_points(node: &Node) -> usize {
    let mut count = if is_decision_point(node.kind()) { 1 } else { 0 };

    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            count += count_decision_points(&cursor.node());
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    count
}

fn is_decision_point(kind: &str) -> bool {
    matches!(
        kind,
        "if_expression"
            | "if_statement"
            | "if_let_expression"
            | "elif_clause"
            | "else_if_clause"
            | "while_expression"
            | "while_statement"
            | "do_statement"
            | "for_expression"
            | "for_statement"
            | "for_in_statement"
            | "loop_expression"
            | "match_arm"
            | "case_clause"
            | "switch_case"
            | "when_entry"
            | "conditional_expression"
            | "ternary_expression"
            | "catch_clause"
            | "except_clause"
            | "&&"
            | "||"
            | "and"
            | "or"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LanguageRegistry;
    use codesift_core::Language;

    #[test]
    fn straight_line_code_scores_one() {
        let registry = LanguageRegistry::new();
        let mut parser = registry.create_parser(&Language::Python).unwrap();
        let tree = parser.parse("def f():\n    return 1\n", None).unwrap();
        assert_eq!(cyclomatic_complexity(&tree.root_node()), 1.0);
    }

    #[test]
    fn branches_raise_complexity() {
        let registry = LanguageRegistry::new();
        let mut parser = registry.create_parser(&Language::Python).unwrap();
        let source = "def f(a):\n    if a:\n        return 1\n    for i in a:\n        pass\n    return 0\n";
        let tree = parser.parse(source, None).unwrap();
        assert!(cyclomatic_complexity(&tree.root_node()) >= 3.0);
    }
}
