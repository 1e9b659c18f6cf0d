//! Import statement extraction.
//!
//!   import Card from './Card';            -> Card  = default of ./Card
//!   import { List as Items } from './ui'; -> Items = List of ./ui
//!   import * as Icons from './icons';     -> Icons = namespace of ./icons

use super::{ImportBinding, ImportedName};
use crate::parser::syntax::SyntaxNode;

/// Names bound by the file's import statements, in source order.
pub(crate) fn extract_imports(root: &SyntaxNode<'_>) -> Vec<ImportBinding> {
    let mut bindings = Vec::new();

    for statement in root.named_children() {
        if !statement.is("import_statement") {
            continue;
        }
        let Some(source) = statement.field("source").map(|s| strip_quotes(s.text())) else {
            continue;
        };
        let Some(clause) = statement.child_of_kind("import_clause") else {
            continue;
        };

        for part in clause.named_children() {
            match part.raw_kind() {
                "identifier" => bindings.push(ImportBinding {
                    local: part.text().to_string(),
                    imported: ImportedName::Default,
                    source: source.clone(),
                }),
                "named_imports" => {
                    for specifier in part.named_children() {
                        if !specifier.is("import_specifier") {
                            continue;
                        }
                        let Some(name) = specifier.field("name") else {
                            continue;
                        };
                        let local = specifier.field("alias").unwrap_or(name);
                        let imported = match name.text() {
                            "default" => ImportedName::Default,
                            other => ImportedName::Named(other.to_string()),
                        };
                        bindings.push(ImportBinding {
                            local: local.text().to_string(),
                            imported,
                            source: source.clone(),
                        });
                    }
                }
                "namespace_import" => {
                    if let Some(ident) = part.named_children().into_iter().next() {
                        bindings.push(ImportBinding {
                            local: ident.text().to_string(),
                            imported: ImportedName::Namespace,
                            source: source.clone(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    bindings
}

fn strip_quotes(s: &str) -> String {
    s.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use std::path::Path;

    #[test]
    fn test_import_forms() {
        let source = r#"
import React, { useState } from 'react';
import Card from "./Card";
import { List as Items } from './ui';
import * as Icons from './icons';
import './styles.css';
"#;
        let parsed = parse_source(Path::new("app.jsx"), source).unwrap();
        let imports = extract_imports(&parsed.root());

        let summary: Vec<(&str, &ImportedName, &str)> = imports
            .iter()
            .map(|i| (i.local.as_str(), &i.imported, i.source.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("React", &ImportedName::Default, "react"),
                ("useState", &ImportedName::Named("useState".into()), "react"),
                ("Card", &ImportedName::Default, "./Card"),
                ("Items", &ImportedName::Named("List".into()), "./ui"),
                ("Icons", &ImportedName::Namespace, "./icons"),
            ]
        );
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("'./Card'"), "./Card");
        assert_eq!(strip_quotes("\"./Card\""), "./Card");
    }
}
