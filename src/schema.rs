//! Field Schema
//!
//! The fixed, ordered list of columns a voice session fills. Column mapping
//! is positional: the index constants below are used by the coercers, the
//! submission layer and the sheet layout.

use serde::Serialize;

/// Type of value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// Surah name with an ayah range, e.g. "سورة البقرة (5-10)"
    PlanRange,
    Date,
    Integer,
    /// Checkbox stored as "TRUE" / "FALSE"
    Boolean,
    Grade,
    FreeText,
}

/// One column of the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    pub index: usize,
    pub name: &'static str,
    pub kind: FieldKind,
}

pub const PLAN_COL: usize = 0;
pub const DATE_COL: usize = 1;
pub const PAGES_COL: usize = 2;
pub const STUDENT_LISTEN_COL: usize = 3;
pub const SHEIKH_LISTEN_COL: usize = 4;
pub const HOME_LISTEN_COL: usize = 5;
pub const ERRORS_COL: usize = 6;
pub const GRADE_COL: usize = 7;
pub const NOTES_COL: usize = 8;

pub const FIELD_COUNT: usize = 9;

/// Columns filled by voice, in cursor order
pub const FIELDS: [FieldDef; FIELD_COUNT] = [
    FieldDef {
        index: PLAN_COL,
        name: "الخطة",
        kind: FieldKind::PlanRange,
    },
    FieldDef {
        index: DATE_COL,
        name: "تاريخ التسميع الفعلي",
        kind: FieldKind::Date,
    },
    FieldDef {
        index: PAGES_COL,
        name: "عدد الصفحات",
        kind: FieldKind::Integer,
    },
    FieldDef {
        index: STUDENT_LISTEN_COL,
        name: "التسميع عند طالب",
        kind: FieldKind::Boolean,
    },
    FieldDef {
        index: SHEIKH_LISTEN_COL,
        name: "الاستماع لشيخ",
        kind: FieldKind::Boolean,
    },
    FieldDef {
        index: HOME_LISTEN_COL,
        name: "التسميع المنزلي",
        kind: FieldKind::Boolean,
    },
    FieldDef {
        index: ERRORS_COL,
        name: "الأخطاء",
        kind: FieldKind::Integer,
    },
    FieldDef {
        index: GRADE_COL,
        name: "التقدير",
        kind: FieldKind::Grade,
    },
    FieldDef {
        index: NOTES_COL,
        name: "ملاحظات",
        kind: FieldKind::FreeText,
    },
];

/// Kind of the field at `index`
pub fn kind_at(index: usize) -> Option<FieldKind> {
    FIELDS.get(index).map(|f| f.kind)
}

/// Columns holding checkbox values
pub fn checkbox_columns() -> impl Iterator<Item = usize> {
    FIELDS
        .iter()
        .filter(|f| f.kind == FieldKind::Boolean)
        .map(|f| f.index)
}
