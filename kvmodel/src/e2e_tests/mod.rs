//! End-to-end tests at the table level.
//!
//! Each test file covers one scenario: records go in through `Table::save`
//! and come back out through `read`, `list` or `delete` on a real store.

#![cfg(test)]

mod helpers;

mod test_base32_ordering;
mod test_delete;
mod test_equals;
mod test_equals_by_id;
mod test_file_store;
mod test_list_by_string;
mod test_no_matching_index;
mod test_non_id_keys;
mod test_offset_limit;
mod test_ordering_numbers;
mod test_ordering_strings;
mod test_partial_failure;
mod test_read;
mod test_separator_in_values;
mod test_stale_index_removal;
mod test_unique_index;
