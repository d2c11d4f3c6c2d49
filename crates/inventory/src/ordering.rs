//! Report ordering: fixed priority tokens followed by an alphabetic fallback.
//!
//! Each order is a stateless constant. Comparison is case-insensitive on the
//! priority tokens, and strings that are equal ignoring case compare equal.
//! Everything else falls back to [`collate`], which folds diacritics for the
//! primary comparison and breaks ties on the exact string.

use core::cmp::Ordering;

use crate::grade::Grade;
use crate::material::Material;

/// A total order over strings with pinned leading and trailing tokens.
#[derive(Debug, Clone, Copy)]
pub struct PriorityOrder {
    leading: &'static [&'static str],
    trailing: &'static [&'static str],
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Leading(usize),
    Unranked,
    Trailing(usize),
}

impl PriorityOrder {
    pub const fn new(leading: &'static [&'static str], trailing: &'static [&'static str]) -> Self {
        Self { leading, trailing }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        if eq_ignore_case(a, b) {
            return Ordering::Equal;
        }
        match (self.rank(a), self.rank(b)) {
            (Rank::Unranked, Rank::Unranked) => collate(a, b),
            (ra, rb) => ra.cmp(&rb),
        }
    }

    fn rank(&self, value: &str) -> Rank {
        if let Some(i) = self.leading.iter().position(|t| eq_ignore_case(t, value)) {
            return Rank::Leading(i);
        }
        if let Some(i) = self.trailing.iter().position(|t| eq_ignore_case(t, value)) {
            return Rank::Trailing(i);
        }
        Rank::Unranked
    }

    pub fn sort<S: AsRef<str>>(&self, values: &mut [S]) {
        values.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref()));
    }
}

/// Company names. "Bat" is the battalion pseudo-company and always comes last.
pub const COMPANY_NAMES: PriorityOrder =
    PriorityOrder::new(&["Stab", "Stabskp", "Stabs Kp"], &["Bat"]);

pub const COMPANY_LOCATIONS: PriorityOrder = PriorityOrder::new(&["KP Rw", "KP Front"], &[]);

pub const MATERIAL_CATEGORIES: PriorityOrder =
    PriorityOrder::new(&["Ristl", "Funk", "Geheim Mat", "Mat", "Fz"], &[]);

pub const GRADE_RANKS: PriorityOrder =
    PriorityOrder::new(&["Of", "Höh Uof", "Uof", "Mannschaft"], &[]);

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Alphabetic fallback: diacritic-folded and case-insensitive first,
/// then lowercase, then the exact string.
pub fn collate(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

fn primary_key(value: &str) -> String {
    value.chars().flat_map(char::to_lowercase).map(fold_diacritic).collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

pub fn sort_company_names<S: AsRef<str>>(names: &mut [S]) {
    COMPANY_NAMES.sort(names);
}

pub fn sort_company_locations<S: AsRef<str>>(locations: &mut [S]) {
    COMPANY_LOCATIONS.sort(locations);
}

/// Grades in rank order.
pub fn sorted_grades(grades: impl IntoIterator<Item = Grade>) -> Vec<Grade> {
    let mut grades: Vec<Grade> = grades.into_iter().collect();
    grades.sort_by(|a, b| GRADE_RANKS.compare(a.description(), b.description()));
    grades
}

pub fn compare_materials(a: &Material, b: &Material) -> Ordering {
    MATERIAL_CATEGORIES
        .compare(&a.category, &b.category)
        .then_with(|| collate(&a.short_description, &b.short_description))
}

/// Materials by category order, then by short description.
pub fn sort_materials(materials: &mut [Material]) {
    materials.sort_by(compare_materials);
}
