use crate::error::Error;
use crate::ledger::Ledger;
use crate::normalize::{normalize_path, PathRule};
use crate::variant::Category;
use ahash::AHashSet;

/// File variants logged for only one of two runs, within one category.
#[derive(Debug, Clone)]
pub struct CategoryDiff {
    pub category: Category,
    pub only_in_first: Vec<String>,
    pub only_in_second: Vec<String>,
}

impl CategoryDiff {
    pub fn is_identical(&self) -> bool {
        self.only_in_first.is_empty() && self.only_in_second.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RunComparison {
    pub first: String,
    pub second: String,
    pub categories: Vec<CategoryDiff>,
}

impl RunComparison {
    pub fn is_identical(&self) -> bool {
        self.categories.iter().all(CategoryDiff::is_identical)
    }
}

/// Compare the logged inputs of two runs, category by category.
pub fn compare_runs(
    ledger: &Ledger,
    first: &str,
    second: &str,
    rules: &[PathRule],
) -> Result<RunComparison, Error> {
    let first = normalize_path(first, rules);
    let second = normalize_path(second, rules);
    for run in [&first, &second] {
        if !ledger.contains_run(run)? {
            return Err(Error::RunNotFound(run.clone()));
        }
    }

    let mut categories = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let a = ledger.files_for(category, &first)?;
        let b = ledger.files_for(category, &second)?;
        categories.push(diff(category, a, b));
    }

    Ok(RunComparison {
        first,
        second,
        categories,
    })
}

fn diff(category: Category, a: Vec<String>, b: Vec<String>) -> CategoryDiff {
    let set_a: AHashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: AHashSet<&str> = b.iter().map(String::as_str).collect();
    CategoryDiff {
        category,
        only_in_first: a.iter().filter(|n| !set_b.contains(n.as_str())).cloned().collect(),
        only_in_second: b.iter().filter(|n| !set_a.contains(n.as_str())).cloned().collect(),
    }
}
