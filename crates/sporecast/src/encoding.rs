//! One-hot encoding of selections into the trained feature layout.
//!
//! The trained model expects a fixed, ordered list of feature columns named
//! `<attribute>_<code>`. Encoding a selection set produces one value per
//! column: `1.0` where the user picked that code for that attribute, `0.0`
//! everywhere else.
//!
//! Two encoders are provided:
//!
//! - [`encode`]: the direct contract, splitting each column name on every
//!   call.
//! - [`ColumnIndex`]: built once from the schema and the trained columns;
//!   holds per attribute the `(code, position)` pairs so encoding is a few
//!   lookups. Building it validates the trained columns against the schema.
//!
//! Both produce identical rows for any complete selection set.

use std::collections::{HashMap, HashSet};

use ndarray::Array1;

use crate::error::{InvalidReason, InvalidSelection, SchemaMismatchError, ValidationError};
use crate::schema::{Attribute, AttributeSchema};
use crate::selection::Selections;

/// Split a feature column name into `(attribute, code)` at the first `_`.
///
/// Attribute names never contain `_`; codes may (and may be symbols such as
/// `?`).
pub fn parse_column(column: &str) -> Result<(&str, &str), SchemaMismatchError> {
    match column.split_once('_') {
        Some((attr, code)) if !attr.is_empty() && !code.is_empty() => Ok((attr, code)),
        _ => Err(SchemaMismatchError::MalformedColumn {
            column: column.to_string(),
        }),
    }
}

/// Encode `selections` against the ordered `trained_columns`.
///
/// Every column's attribute must have a selection; a column whose attribute
/// is unselected is a configuration mismatch, not a zero.
pub fn encode<S: AsRef<str>>(
    selections: &Selections,
    trained_columns: &[S],
) -> Result<Array1<f64>, SchemaMismatchError> {
    let mut row = Array1::zeros(trained_columns.len());
    for (pos, column) in trained_columns.iter().enumerate() {
        let column = column.as_ref();
        let (attribute, code) = parse_column(column)?;
        let selected = selections
            .get(attribute)
            .ok_or_else(|| SchemaMismatchError::MissingSelection {
                column: column.to_string(),
            })?;
        if selected == code {
            row[pos] = 1.0;
        }
    }
    Ok(row)
}

// =============================================================================
// ColumnIndex
// =============================================================================

/// Trained columns of a single attribute.
#[derive(Debug, Clone)]
pub struct AttributeColumns {
    attribute: &'static Attribute,
    /// `(code, column position)` in schema category order.
    columns: Vec<(&'static str, usize)>,
}

impl AttributeColumns {
    #[inline]
    pub fn attribute(&self) -> &'static Attribute {
        self.attribute
    }

    /// `(code, position)` pairs in schema category order.
    #[inline]
    pub fn columns(&self) -> &[(&'static str, usize)] {
        &self.columns
    }

    /// Position of the column for `code`, if it was trained.
    pub fn position(&self, code: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(c, _)| *c == code)
            .map(|&(_, pos)| pos)
    }

    /// Codes the model was trained on, in schema order.
    pub fn trained_codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|&(code, _)| code)
    }
}

/// Precomputed mapping from attributes to trained column positions.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    schema: &'static AttributeSchema,
    groups: Vec<AttributeColumns>,
    n_columns: usize,
}

impl ColumnIndex {
    /// Build the index, validating `trained_columns` against `schema`.
    ///
    /// Fails if any column is malformed, duplicated, or names an attribute or
    /// code absent from the schema, or if a schema attribute has no column.
    pub fn build<S: AsRef<str>>(
        schema: &'static AttributeSchema,
        trained_columns: &[S],
    ) -> Result<Self, SchemaMismatchError> {
        let mut seen = HashSet::with_capacity(trained_columns.len());
        let mut positions: Vec<HashMap<&'static str, usize>> = vec![HashMap::new(); schema.len()];

        for (pos, column) in trained_columns.iter().enumerate() {
            let column = column.as_ref();
            if !seen.insert(column) {
                return Err(SchemaMismatchError::DuplicateColumn {
                    column: column.to_string(),
                });
            }
            let (attr_name, code) = parse_column(column)?;
            let attr_idx = schema.position(attr_name).ok_or_else(|| {
                SchemaMismatchError::UnknownAttribute {
                    column: column.to_string(),
                    attribute: attr_name.to_string(),
                }
            })?;
            let attribute = &schema.attributes()[attr_idx];
            let category = attribute.category(code).ok_or_else(|| {
                SchemaMismatchError::UnknownCategory {
                    column: column.to_string(),
                    attribute: attr_name.to_string(),
                    code: code.to_string(),
                }
            })?;
            positions[attr_idx].insert(category.code, pos);
        }

        let groups = schema
            .attributes()
            .iter()
            .zip(positions)
            .map(|(attribute, by_code)| {
                if by_code.is_empty() {
                    return Err(SchemaMismatchError::UntrainedAttribute {
                        attribute: attribute.name.to_string(),
                    });
                }
                let columns = attribute
                    .categories
                    .iter()
                    .filter_map(|c| by_code.get(c.code).map(|&pos| (c.code, pos)))
                    .collect();
                Ok(AttributeColumns { attribute, columns })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            n_columns = trained_columns.len(),
            n_attributes = groups.len(),
            "built column index"
        );

        Ok(Self {
            schema,
            groups,
            n_columns: trained_columns.len(),
        })
    }

    #[inline]
    pub fn schema(&self) -> &'static AttributeSchema {
        self.schema
    }

    /// Number of trained columns (encoded row length).
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Per-attribute column groups, in schema order.
    #[inline]
    pub fn groups(&self) -> &[AttributeColumns] {
        &self.groups
    }

    /// Column group for an attribute.
    pub fn group(&self, attribute: &str) -> Option<&AttributeColumns> {
        self.schema
            .position(attribute)
            .and_then(|idx| self.groups.get(idx))
    }

    /// Check that `selections` is complete and every selection can be
    /// encoded.
    pub fn validate(&self, selections: &Selections) -> Result<(), ValidationError> {
        let missing = selections
            .missing(self.schema)
            .into_iter()
            .map(str::to_string)
            .collect();

        let invalid = selections
            .iter()
            .filter_map(|(attribute, code)| {
                let reason = match self.group(attribute) {
                    None => InvalidReason::UnknownAttribute,
                    Some(group) if !group.attribute().has_code(code) => {
                        InvalidReason::UnknownCategory
                    }
                    Some(group) if group.position(code).is_none() => InvalidReason::NotTrained,
                    Some(_) => return None,
                };
                Some(InvalidSelection {
                    attribute: attribute.to_string(),
                    code: code.to_string(),
                    reason,
                })
            })
            .collect();

        let err = ValidationError { missing, invalid };
        if err.is_empty() {
            Ok(())
        } else {
            Err(err)
        }
    }

    /// Encode validated selections into the trained column layout.
    ///
    /// An attribute without a selection is reported as a mismatch on its
    /// first trained column. A selected code with no trained column leaves
    /// its group all zero; [`validate`](Self::validate) rejects that case.
    pub fn encode(&self, selections: &Selections) -> Result<Array1<f64>, SchemaMismatchError> {
        let mut row = Array1::zeros(self.n_columns);
        for group in &self.groups {
            let code = selections.get(group.attribute.name).ok_or_else(|| {
                SchemaMismatchError::MissingSelection {
                    column: format!("{}_{}", group.attribute.name, group.columns[0].0),
                }
            })?;
            if let Some(pos) = group.position(code) {
                row[pos] = 1.0;
            }
        }
        Ok(row)
    }
}
