use codesift_core::{ElementType, Language, SemanticElement};
use tree_sitter::{Node, TreeCursor};

/// Walks a parsed tree collecting named definitions (functions, classes,
/// methods, structs) with 1-based inclusive line spans, parameter lists,
/// and doc comments.
pub struct ElementVisitor<'a> {
    language: &'a Language,
    source: &'a str,
    pub elements: Vec<SemanticElement>,
}

impl<'a> ElementVisitor<'a> {
    pub fn new(language: &'a Language, source: &'a str) -> Self {
        Self {
            language,
            source,
            elements: Vec::new(),
        }
    }

    pub fn visit(&mut self, root: Node) {
        let mut cursor = root.walk();
        self.visit_node(&mut cursor, 0);
    }

    fn visit_node(&mut self, cursor: &mut TreeCursor, container_depth: usize) {
        let node = cursor.node();

        if let Some(element_type) = self.map_element_type(node.kind(), container_depth) {
            if let Some(element) = self.create_element(&node, element_type) {
                self.elements.push(element);
            }
        }

        let child_depth = if self.is_container(node.kind()) {
            container_depth + 1
        } else {
            container_depth
        };

        if cursor.goto_first_child() {
            loop {
                self.visit_node(cursor, child_depth);
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            cursor.goto_parent();
        }
    }

    /// Nodes whose nested functions count as methods.
    fn is_container(&self, kind: &str) -> bool {
        match self.language {
            Language::Rust => matches!(kind, "impl_item" | "trait_item"),
            Language::Python => kind == "class_definition",
            Language::TypeScript | Language::JavaScript => {
                matches!(kind, "class_declaration" | "class")
            }
            Language::Java => matches!(kind, "class_declaration" | "interface_declaration"),
            Language::Cpp => matches!(kind, "class_specifier" | "struct_specifier"),
            _ => false,
        }
    }

    fn map_element_type(&self, kind: &str, container_depth: usize) -> Option<ElementType> {
        let in_container = container_depth > 0;
        match (self.language, kind) {
            (Language::Rust, "function_item") if in_container => Some(ElementType::Method),
            (Language::Rust, "function_item") => Some(ElementType::Function),
            (Language::Rust, "struct_item") => Some(ElementType::Struct),

            (Language::Python, "function_definition") if in_container => {
                Some(ElementType::Method)
            }
            (Language::Python, "function_definition") => Some(ElementType::Function),
            (Language::Python, "class_definition") => Some(ElementType::Class),

            (Language::TypeScript | Language::JavaScript, "function_declaration") => {
                Some(ElementType::Function)
            }
            (Language::TypeScript | Language::JavaScript, "class_declaration") => {
                Some(ElementType::Class)
            }
            (Language::TypeScript | Language::JavaScript, "method_definition") => {
                Some(ElementType::Method)
            }

            (Language::Go, "function_declaration") => Some(ElementType::Function),
            (Language::Go, "method_declaration") => Some(ElementType::Method),
            (Language::Go, "type_declaration") => Some(ElementType::Struct),

            (Language::Java, "class_declaration") => Some(ElementType::Class),
            (Language::Java, "method_declaration") => Some(ElementType::Method),

            (Language::Cpp, "function_definition") if in_container => Some(ElementType::Method),
            (Language::Cpp, "function_definition") => Some(ElementType::Function),
            (Language::Cpp, "class_specifier") => Some(ElementType::Class),
            (Language::Cpp, "struct_specifier") => Some(ElementType::Struct),

            _ => None,
        }
    }

    fn create_element(&self, node: &Node, element_type: ElementType) -> Option<SemanticElement> {
        let name = self.extract_name(node)?;
        let content = node.utf8_text(self.source.as_bytes()).ok()?.to_string();
        let start_line = node.start_position().row as u32 + 1;
        let end_line = node.end_position().row as u32 + 1;

        let mut element =
            SemanticElement::new(name, element_type, start_line, end_line, content).ok()?;
        element = element.with_parameters(self.extract_parameters(node));
        if let Some(doc) = self.extract_doc_comment(node) {
            element = element.with_doc_comment(doc);
        }
        Some(element)
    }

    fn extract_name(&self, node: &Node) -> Option<String> {
        if let Some(name_node) = node.child_by_field_name("name") {
            return name_node
                .utf8_text(self.source.as_bytes())
                .ok()
                .map(String::from);
        }

        // Go type_declaration and similar wrappers keep the name one level down.
        for child in node.named_children(&mut node.walk()) {
            if matches!(
                child.kind(),
                "identifier" | "type_identifier" | "field_identifier" | "name"
            ) {
                return child
                    .utf8_text(self.source.as_bytes())
                    .ok()
                    .map(String::from);
            }
            if let Some(name_node) = child.child_by_field_name("name") {
                return name_node
                    .utf8_text(self.source.as_bytes())
                    .ok()
                    .map(String::from);
            }
        }

        None
    }

    fn extract_parameters(&self, node: &Node) -> Vec<String> {
        let Some(params) = node.child_by_field_name("parameters") else {
            return Vec::new();
        };
        params
            .named_children(&mut params.walk())
            .filter(|child| child.kind() != "comment")
            .filter_map(|child| child.utf8_text(self.source.as_bytes()).ok())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect()
    }

    fn extract_doc_comment(&self, node: &Node) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        let mut sibling = node.prev_named_sibling();
        while let Some(prev) = sibling {
            if !matches!(prev.kind(), "line_comment" | "block_comment" | "comment") {
                break;
            }
            if let Ok(text) = prev.utf8_text(self.source.as_bytes()) {
                parts.push(text.trim().to_string());
            }
            sibling = prev.prev_named_sibling();
        }
        if !parts.is_empty() {
            parts.reverse();
            return Some(parts.join("\n"));
        }

        if *self.language == Language::Python {
            return self.python_docstring(node);
        }
        None
    }

    fn python_docstring(&self, node: &Node) -> Option<String> {
        let body = node.child_by_field_name("body")?;
        let first = body.named_child(0)?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let string = first.named_child(0)?;
        if string.kind() != "string" {
            return None;
        }
        string
            .utf8_text(self.source.as_bytes())
            .ok()
            .map(|s| s.trim_matches(|c| c == '"' || c == '\'').trim().to_string())
    }
}

/// Import and include statements, used to fill dependency lists.
pub fn collect_dependencies(root: Node, source: &str) -> Vec<String> {
    let mut deps = Vec::new();
    let mut cursor = root.walk();
    collect_dependencies_recursive(&mut cursor, source, &mut deps);
    deps
}

fn collect_dependencies_recursive(cursor: &mut TreeCursor, source: &str, deps: &mut Vec<String>) {
    let node = cursor.node();
    if matches!(
        node.kind(),
        "use_declaration"
            | "import_statement"
            | "import_from_statement"
            | "import_declaration"
            | "preproc_include"
    ) {
        if let Ok(text) = node.utf8_text(source.as_bytes()) {
            if let Some(line) = text.lines().next() {
                deps.push(line.trim().trim_end_matches(';').to_string());
            }
        }
        return;
    }

    if cursor.goto_first_child() {
        loop {
            collect_dependencies_recursive(cursor, source, deps);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}
