//! Plain-text shopping list built from the recipes in a user's cart.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use minijinja::{context, Environment};

use crate::core::error::{AppError, Result};
use crate::features::recipes::dtos::ShoppingItem;
use crate::features::recipes::models::CartIngredientRow;

const TEMPLATE_NAME: &str = "shopping_list.txt";

static TEMPLATE_ENV: OnceLock<std::result::Result<Environment<'static>, String>> =
    OnceLock::new();

fn environment() -> Result<&'static Environment<'static>> {
    TEMPLATE_ENV
        .get_or_init(|| {
            let mut env = Environment::new();
            env.set_trim_blocks(true);
            env.set_lstrip_blocks(true);
            env.set_keep_trailing_newline(true);
            env.add_template(
                TEMPLATE_NAME,
                include_str!("../../../../templates/shopping_list.txt"),
            )
            .map_err(|e| e.to_string())?;
            Ok(env)
        })
        .as_ref()
        .map_err(|e| AppError::Internal(format!("Shopping list template is invalid: {}", e)))
}

/// First character upper-cased, the rest lower-cased
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Sum amounts per `(name, unit)`, ordered by name then unit
pub fn aggregate(rows: Vec<CartIngredientRow>) -> Vec<ShoppingItem> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for row in rows {
        *totals
            .entry((row.name, row.measurement_unit))
            .or_default() += i64::from(row.amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| ShoppingItem {
            name: capitalize(&name),
            measurement_unit,
            amount,
        })
        .collect()
}

pub fn render(
    recipe_names: &[String],
    products: &[ShoppingItem],
    compiled_on: NaiveDate,
) -> Result<String> {
    let recipes: Vec<String> = recipe_names.iter().map(|n| capitalize(n)).collect();

    environment()?
        .get_template(TEMPLATE_NAME)
        .and_then(|template| {
            template.render(context! {
                compiled_on => compiled_on.format("%d.%m.%Y").to_string(),
                recipes => recipes,
                products => products,
            })
        })
        .map_err(|e| {
            tracing::error!("Failed to render shopping list: {}", e);
            AppError::Internal(format!("Failed to render shopping list: {}", e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i32) -> CartIngredientRow {
        CartIngredientRow {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("salt"), "Salt");
        assert_eq!(capitalize("BLACK pepper"), "Black pepper");
        assert_eq!(capitalize("яблоко"), "Яблоко");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_aggregate_sums_same_name_and_unit() {
        let items = aggregate(vec![
            line("salt", "g", 2),
            line("flour", "g", 500),
            line("salt", "g", 3),
            line("salt", "pinch", 1),
        ]);

        assert_eq!(
            items,
            vec![
                ShoppingItem {
                    name: "Flour".to_string(),
                    measurement_unit: "g".to_string(),
                    amount: 500
                },
                ShoppingItem {
                    name: "Salt".to_string(),
                    measurement_unit: "g".to_string(),
                    amount: 5
                },
                ShoppingItem {
                    name: "Salt".to_string(),
                    measurement_unit: "pinch".to_string(),
                    amount: 1
                },
            ]
        );
    }

    #[test]
    fn test_render_report() {
        let products = aggregate(vec![line("salt", "g", 2), line("salt", "g", 3)]);
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let report = render(
            &["pancakes".to_string(), "tomato soup".to_string()],
            &products,
            date,
        )
        .unwrap();

        let expected = "SHOPPING LIST\n\
                        Compiled on: 07.03.2024\n\
                        =========================================\n\
                        RECIPES:\n \
                        - Pancakes\n \
                        - Tomato soup\n\
                        \n\
                        PRODUCTS:\n\
                        1. Salt (g) 5\n\
                        =========================================\n";
        assert_eq!(report, expected);
    }

    #[test]
    fn test_render_empty_cart() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let report = render(&[], &[], date).unwrap();
        assert!(report.contains("RECIPES:\n\nPRODUCTS:\n===="));
    }
}
