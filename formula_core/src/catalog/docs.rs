//! Markdown reference for the catalog.
//!
//! Lists every formula by topic with its equation, variables, and the closed
//! form the solver uses for each variable, so the algebra can be audited
//! without reading code.

use super::Catalog;

/// Render the full catalog as a markdown document.
pub fn generate_catalog_markdown(catalog: &Catalog) -> String {
    let mut output = String::with_capacity(16_000);

    output.push_str(
        r#"# Lambda Explorer Formula Catalog

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-catalog`

Each formula can be solved for any one of its variables given all the others.
The **Solved forms** table shows the closed form used for each variable.

---

"#,
    );

    let topics = catalog.by_topic();
    for (topic, entries) in &topics {
        output.push_str(&format!("## {}\n\n", topic.display_name()));

        for entry in entries {
            let definition = &entry.definition;
            output.push_str(&format!("### {} (`{}`)\n\n", definition.name, definition.id));
            output.push_str(&format!("{}\n\n", definition.description));
            output.push_str(&format!("**Equation:** `{}`\n\n", entry.formula.equation()));

            output.push_str("**Variables:**\n\n");
            output.push_str("| Symbol | Description | Units |\n");
            output.push_str("|--------|-------------|-------|\n");
            for var in &definition.variables {
                output.push_str(&format!("| `{}` | {} | {} |\n", var.symbol, var.description, var.units));
            }
            output.push('\n');

            output.push_str("**Solved forms:**\n\n");
            output.push_str("| Unknown | Expression |\n");
            output.push_str("|---------|------------|\n");
            for var in entry.formula.variables() {
                if let Some(expr) = entry.formula.solved_expression(var) {
                    output.push_str(&format!("| `{}` | `{}` |\n", var, expr));
                }
            }
            output.push('\n');

            if !definition.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &definition.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Formulas:** {}\n- **Topics:** {}\n- **Distinct Variables:** {}\n",
        catalog.len(),
        topics.len(),
        catalog.all_variables().len()
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog;

    #[test]
    fn test_markdown_lists_every_formula() {
        let catalog = catalog().unwrap();
        let markdown = generate_catalog_markdown(catalog);
        for id in catalog.ids() {
            assert!(markdown.contains(&format!("(`{}`)", id)), "{} missing", id);
        }
        assert!(markdown.contains("## Propulsion"));
        assert!(markdown.contains("| `r` | `sqrt(A / pi)` |"));
        assert!(markdown.contains("**Total Formulas:** 21"));
    }
}
