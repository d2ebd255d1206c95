//! Builds the navigation tree: documents grouped by their `Parent` into
//! [`Category`]s, with both the categories and their pages sorted by `Order`.

use std::collections::HashMap;

use crate::document::Document;

/// A named group of documents sharing the same `Parent`.
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    /// The `Parent` value shared by every page in the category.
    pub name: String,

    /// The lowest `Order` among the category's pages.
    pub order: i64,

    /// The category's pages, sorted by `Order`.
    pub pages: Vec<Document>,
}

/// The sorted sequence of [`Category`]s shown in the sidebar. Built once by
/// [`Navigation::build`] and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Navigation {
    categories: Vec<Category>,
}

impl Navigation {
    /// Groups `documents` by `Parent`. Documents with a blank `Parent` have
    /// no navigation entry and are skipped. Each category's order is the
    /// minimum of its pages' orders, so it doesn't depend on the order the
    /// documents arrive in. Pages are sorted by `Order` (equal orders keep
    /// their arrival order); categories are sorted by `Order`, then by
    /// case-insensitive name.
    pub fn build<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Navigation {
        let mut grouped: HashMap<&str, Category> = HashMap::new();
        for doc in documents {
            if doc.parent.trim().is_empty() {
                continue;
            }
            match grouped.get_mut(doc.parent.as_str()) {
                None => {
                    grouped.insert(
                        doc.parent.as_str(),
                        Category {
                            name: doc.parent.clone(),
                            order: doc.order,
                            pages: vec![doc.clone()],
                        },
                    );
                }
                Some(category) => {
                    category.pages.push(doc.clone());
                    category.order = category.order.min(doc.order);
                }
            }
        }

        let mut categories: Vec<Category> = grouped.into_values().collect();
        for category in categories.iter_mut() {
            category.pages.sort_by_key(|page| page.order);
        }
        categories.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                // only reached for names differing in case alone
                .then_with(|| a.name.cmp(&b.name))
        });

        Navigation { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
