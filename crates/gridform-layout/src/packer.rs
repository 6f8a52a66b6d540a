//! Row packing.
//!
//! # Invariants
//!
//! 1. Every emitted row spans exactly `columns` units.
//! 2. Field order is preserved across and within rows.
//! 3. Placeholders are appended only at the end of a row, or form a row of
//!    their own when a row break arrives with nothing pending.
//!
//! # Failure Modes
//!
//! - A field span outside `1..=columns`: [`LayoutError::InvalidSize`].
//! - A row that does not sum to `columns` after packing:
//!   [`LayoutError::RowWidth`]. The packer cannot produce one from valid
//!   spans; the check guards the output contract.

use std::rc::Rc;

use gridform_core::{FieldRole, InternalField};

use crate::{GridConfig, LayoutError};

/// One placed field and the span it occupies.
#[derive(Debug, Clone)]
pub struct GridCell {
    pub field: Rc<InternalField>,
    pub span: u8,
}

impl GridCell {
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.field.role != FieldRole::Field
    }
}

/// A packed row.
#[derive(Debug, Clone, Default)]
pub struct GridRow {
    cells: Vec<GridCell>,
}

impl GridRow {
    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Sum of spans.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.cells.iter().map(|c| u32::from(c.span)).sum()
    }

    /// Fields that are not placeholders or spacers.
    #[must_use]
    pub fn visible_fields(&self) -> Vec<&InternalField> {
        self.cells
            .iter()
            .filter(|c| !c.is_placeholder())
            .map(|c| c.field.as_ref())
            .collect()
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(GridCell::is_placeholder)
    }

    /// `name:span` per cell, placeholders as `_:span`. Handy in assertions.
    #[must_use]
    pub fn summary(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|c| {
                if c.is_placeholder() {
                    format!("_:{}", c.span)
                } else {
                    format!("{}:{}", c.field.name, c.span)
                }
            })
            .collect()
    }
}

/// Packs fields into rows of a fixed width.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridPacker {
    config: GridConfig,
}

struct RowBuilder {
    columns: u8,
    cells: Vec<GridCell>,
    used: u8,
    rows: Vec<GridRow>,
}

impl RowBuilder {
    fn push(&mut self, field: Rc<InternalField>, span: u8) {
        self.cells.push(GridCell { field, span });
        self.used += span;
        if self.used == self.columns {
            self.flush();
        }
    }

    fn pad_and_flush(&mut self) {
        let remaining = self.columns - self.used;
        if remaining > 0 {
            self.cells.push(GridCell {
                field: Rc::new(InternalField::placeholder(remaining)),
                span: remaining,
            });
        }
        self.flush();
    }

    fn flush(&mut self) {
        self.rows.push(GridRow {
            cells: std::mem::take(&mut self.cells),
        });
        self.used = 0;
    }
}

impl GridPacker {
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> GridConfig {
        self.config
    }

    /// Pack `fields` in order.
    pub fn pack(&self, fields: &[InternalField]) -> Result<Vec<GridRow>, LayoutError> {
        self.pack_shared(fields.iter().cloned().map(Rc::new))
    }

    /// Pack already shared fields; cells keep the given allocations.
    pub fn pack_shared(
        &self,
        fields: impl IntoIterator<Item = Rc<InternalField>>,
    ) -> Result<Vec<GridRow>, LayoutError> {
        self.config.validate()?;
        let columns = self.config.columns;
        let _span = tracing::debug_span!("gridform.pack", columns).entered();

        let mut rows = RowBuilder {
            columns,
            cells: Vec::new(),
            used: 0,
            rows: Vec::new(),
        };

        for field in fields {
            if field.is_row_break() {
                if rows.used > 0 {
                    rows.pad_and_flush();
                } else {
                    rows.push(Rc::new(InternalField::placeholder(columns)), columns);
                }
                continue;
            }

            let span = field.size.unwrap_or(columns);
            if span == 0 || span > columns {
                return Err(LayoutError::InvalidSize {
                    field: field.name.clone(),
                    size: span,
                    max: columns,
                });
            }
            if rows.used + span > columns {
                rows.pad_and_flush();
            }
            rows.push(field, span);
        }
        if !rows.cells.is_empty() {
            rows.pad_and_flush();
        }

        for (index, row) in rows.rows.iter().enumerate() {
            let width = row.width();
            if width != u32::from(columns) {
                return Err(LayoutError::RowWidth {
                    row: index,
                    width,
                    expected: columns,
                });
            }
        }

        tracing::debug!(rows = rows.rows.len(), "packed");
        Ok(rows.rows)
    }
}

/// Pack with the default 12-unit grid.
pub fn pack(fields: &[InternalField]) -> Result<Vec<GridRow>, LayoutError> {
    GridPacker::default().pack(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(name: &str, size: u8) -> InternalField {
        let mut f = InternalField::detached(name);
        f.size = Some(size);
        f
    }

    fn summaries(rows: &[GridRow]) -> Vec<Vec<String>> {
        rows.iter().map(GridRow::summary).collect()
    }

    #[test]
    fn unsized_fields_take_full_rows() {
        let rows = pack(&[
            InternalField::detached("firstName"),
            InternalField::detached("lastName"),
        ])
        .expect("pack");
        assert_eq!(
            summaries(&rows),
            [vec!["firstName:12"], vec!["lastName:12"]]
        );
    }

    #[test]
    fn halves_share_a_row() {
        let rows = pack(&[sized("a", 6), sized("b", 6), sized("c", 12)]).expect("pack");
        assert_eq!(summaries(&rows), [vec!["a:6", "b:6"], vec!["c:12"]]);
        assert_eq!(rows[0].visible_fields().len(), 2);
    }

    #[test]
    fn overflow_pads_and_wraps() {
        let rows = pack(&[sized("a", 8), sized("b", 6)]).expect("pack");
        assert_eq!(summaries(&rows), [vec!["a:8", "_:4"], vec!["b:6", "_:6"]]);
    }

    #[test]
    fn row_break_with_pending_width_pads() {
        let rows = pack(&[sized("a", 6), InternalField::spacer(None), sized("b", 6)]).expect("pack");
        assert_eq!(summaries(&rows), [vec!["a:6", "_:6"], vec!["b:6", "_:6"]]);
    }

    #[test]
    fn row_break_on_empty_row_emits_blank_row() {
        let rows = pack(&[
            sized("a", 6),
            sized("b", 6),
            InternalField::spacer(None),
            sized("c", 6),
        ])
        .expect("pack");
        assert_eq!(
            summaries(&rows),
            [vec!["a:6", "b:6"], vec!["_:12"], vec!["c:6", "_:6"]]
        );
        assert!(rows[1].is_blank());
        assert!(rows[1].visible_fields().is_empty());
    }

    #[test]
    fn leading_row_break_is_blank_row() {
        let rows = pack(&[InternalField::spacer(None)]).expect("pack");
        assert_eq!(summaries(&rows), [vec!["_:12"]]);
    }

    #[test]
    fn sized_spacer_is_a_blank_cell() {
        let rows = pack(&[InternalField::spacer(Some(4)), sized("a", 8)]).expect("pack");
        assert_eq!(summaries(&rows), [vec!["_:4", "a:8"]]);
        assert_eq!(rows[0].visible_fields()[0].name, "a");
    }

    #[test]
    fn oversized_field_is_fatal() {
        let err = pack(&[sized("ok", 6), sized("bio", 13)]).expect_err("13 exceeds the grid");
        assert_eq!(
            err,
            LayoutError::InvalidSize {
                field: "bio".into(),
                size: 13,
                max: 12
            }
        );
        assert!(err.to_string().contains("bio"));
        assert!(pack(&[sized("zero", 0)]).is_err());
    }

    #[test]
    fn custom_width_is_used_throughout() {
        let packer = GridPacker::new(GridConfig::with_columns(4));
        let rows = packer
            .pack(&[InternalField::detached("a"), sized("b", 3)])
            .expect("pack");
        assert_eq!(summaries(&rows), [vec!["a:4"], vec!["b:3", "_:1"]]);
        assert!(packer.pack(&[sized("c", 5)]).is_err());
    }

    #[test]
    fn invalid_columns_rejected_before_packing() {
        let packer = GridPacker::new(GridConfig::with_columns(30));
        assert!(matches!(
            packer.pack(&[]),
            Err(LayoutError::InvalidColumns { columns: 30, .. })
        ));
    }

    #[test]
    fn shared_fields_keep_identity() {
        let field = Rc::new(sized("a", 12));
        let rows = GridPacker::default()
            .pack_shared([Rc::clone(&field)])
            .expect("pack");
        assert!(Rc::ptr_eq(&rows[0].cells()[0].field, &field));
    }
}
