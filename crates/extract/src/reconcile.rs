//! Reconciliation.
//!
//! Folds parsed mentions into one record per identifier, in scan order.
//! Deterministic pure function of its ordered input: running it twice on
//! the same mention list yields identical output.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::model::{Field, Mention, ParsedAttributes, SecurityRecord};

/// Who supplied a field's current value, and how internally consistent
/// that mention's own quantity/price/value triple was.
#[derive(Debug, Clone, Copy)]
struct Supplier {
    from_table: bool,
    triple_error: Option<f64>,
}

/// Merge all mentions into records keyed by canonical identifier.
/// `parsed` runs parallel to `mentions`. Records come out in the order
/// their first mention appeared.
pub fn reconcile(mentions: &[Mention], parsed: &[ParsedAttributes]) -> Vec<SecurityRecord> {
    let mut order: Vec<String> = Vec::new();
    let mut builders: HashMap<String, Builder> = HashMap::new();

    for (mention, attrs) in mentions.iter().zip(parsed) {
        let builder = match builders.entry(mention.identifier.value.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                order.push(mention.identifier.value.clone());
                entry.insert(Builder::new(mention))
            }
        };
        builder.fold(mention, attrs);
    }

    order
        .into_iter()
        .map(|key| {
            builders
                .remove(&key)
                .expect("every ordered key has a builder")
                .record
        })
        .collect()
}

struct Builder {
    record: SecurityRecord,
    suppliers: HashMap<Field, Supplier>,
}

impl Builder {
    fn new(mention: &Mention) -> Self {
        Self {
            record: SecurityRecord::new(mention.identifier.clone()),
            suppliers: HashMap::new(),
        }
    }

    /// Fold one mention in. Every mention counts as corroboration whether
    /// or not it changes a field.
    fn fold(&mut self, mention: &Mention, attrs: &ParsedAttributes) {
        let incoming = Supplier {
            from_table: mention.context.is_table_row(),
            triple_error: attrs.consistency_error(),
        };

        merge(
            &mut self.record.name,
            &mut self.suppliers,
            &mut self.record.provenance,
            Field::Name,
            attrs.name.as_ref(),
            incoming,
            mention.id,
        );
        merge(
            &mut self.record.quantity,
            &mut self.suppliers,
            &mut self.record.provenance,
            Field::Quantity,
            attrs.quantity.as_ref(),
            incoming,
            mention.id,
        );
        merge(
            &mut self.record.price,
            &mut self.suppliers,
            &mut self.record.provenance,
            Field::Price,
            attrs.price.as_ref(),
            incoming,
            mention.id,
        );
        merge(
            &mut self.record.value,
            &mut self.suppliers,
            &mut self.record.provenance,
            Field::Value,
            attrs.value.as_ref(),
            incoming,
            mention.id,
        );
        merge(
            &mut self.record.currency,
            &mut self.suppliers,
            &mut self.record.provenance,
            Field::Currency,
            attrs.currency.as_ref(),
            incoming,
            mention.id,
        );

        self.record.mention_count += 1;
    }
}

/// Field update rule: fill when absent; overwrite only table-row against
/// table-row when the incoming mention's triple is at least as consistent
/// (ties go to the later mention). Free-text values are never overwritten.
/// Provenance records every non-absent supplier either way.
fn merge<T: Clone>(
    slot: &mut Option<T>,
    suppliers: &mut HashMap<Field, Supplier>,
    provenance: &mut std::collections::BTreeMap<Field, Vec<usize>>,
    field: Field,
    incoming_value: Option<&T>,
    incoming: Supplier,
    mention_id: usize,
) {
    let Some(value) = incoming_value else { return };
    provenance.entry(field).or_default().push(mention_id);

    let take = match (slot.is_some(), suppliers.get(&field)) {
        (false, _) => true,
        (true, Some(current)) => {
            current.from_table
                && incoming.from_table
                && error_rank(incoming.triple_error) <= error_rank(current.triple_error)
        }
        (true, None) => false,
    };
    if take {
        *slot = Some(value.clone());
        suppliers.insert(field, incoming);
    }
}

/// Mentions without a complete triple rank worst.
fn error_rank(error: Option<f64>) -> f64 {
    error.unwrap_or(f64::INFINITY)
}
