//! Metadata matching
//!
//! Reconciles an externally supplied table of metadata rows (for instance a
//! CSV of per-well annotations) against the image sets already in the
//! store. Zero matches for a row is a normal outcome, never an error.

use crate::error::{Error, Result};
use crate::store::{Store, IMAGE};
use crate::value::{Value, ValueKey};
use std::collections::{HashMap, VecDeque};

impl Store {
    /// Match R query rows against the registered image sets.
    ///
    /// `columns` holds one value column per entry of `keys`, all of length
    /// R; row i is the tuple `(columns[0][i], columns[1][i], ...)`. The
    /// result has one image-number list per row:
    ///
    /// 1. When none of `keys` was ever recorded as metadata, row i maps to
    ///    image number i + 1 (the caller supplied rows in image order).
    /// 2. When the registered image-set count equals R, each row resolves
    ///    to a single image number with the same metadata tuple.
    /// 3. Otherwise rows claim whole metadata groups, so one row may
    ///    resolve to several image numbers; a row matching nothing gets an
    ///    empty list.
    ///
    /// Keys recorded nowhere in the store are ignored during comparison;
    /// the positional fallback applies only when all of them are
    /// unrecorded. In every branch an image number resolves to at most one
    /// row.
    pub fn match_metadata(&self, keys: &[&str], columns: &[Vec<Value>]) -> Result<Vec<Vec<u32>>> {
        if keys.len() != columns.len() {
            return Err(Error::InvalidInput(format!(
                "match_metadata: {} keys but {} value columns",
                keys.len(),
                columns.len()
            )));
        }
        let row_count = columns.first().map(Vec::len).unwrap_or(0);
        if columns.iter().any(|c| c.len() != row_count) {
            return Err(Error::InvalidInput(
                "match_metadata: value columns differ in length".to_string(),
            ));
        }

        // Only keys that exist somewhere in the store can distinguish
        // image sets.
        let present: Vec<usize> = (0..keys.len())
            .filter(|&i| self.has_feature(IMAGE, keys[i]))
            .collect();
        if present.is_empty() {
            return Ok((1..=row_count as u32).map(|n| vec![n]).collect());
        }

        let image_numbers = self.get_image_numbers();
        let mut groups: HashMap<Vec<Option<ValueKey>>, Vec<u32>> = HashMap::new();
        for &image_number in &image_numbers {
            let tuple: Vec<Option<ValueKey>> = present
                .iter()
                .map(|&i| {
                    self.get_measurement(IMAGE, keys[i], image_number)
                        .map(Value::group_key)
                })
                .collect();
            groups.entry(tuple).or_default().push(image_number);
        }

        let row_key = |i: usize| -> Vec<Option<ValueKey>> {
            present
                .iter()
                .map(|&k| Some(columns[k][i].group_key()))
                .collect()
        };

        let mut results = Vec::with_capacity(row_count);
        if image_numbers.len() == row_count {
            // 1:1 case; a duplicated tuple hands out its image numbers in
            // ascending order, one per row.
            let mut queues: HashMap<Vec<Option<ValueKey>>, VecDeque<u32>> = groups
                .into_iter()
                .map(|(k, v)| (k, v.into()))
                .collect();
            for i in 0..row_count {
                let matched = queues.get_mut(&row_key(i)).and_then(VecDeque::pop_front);
                results.push(matched.map(|n| vec![n]).unwrap_or_default());
            }
        } else {
            // Group case; the first row with a given tuple takes the whole
            // group.
            for i in 0..row_count {
                results.push(groups.remove(&row_key(i)).unwrap_or_default());
            }
        }
        Ok(results)
    }
}
