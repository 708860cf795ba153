//! Flattening structured parameter values into query pairs

use std::collections::BTreeMap;

use cloudcall_domain::ParamValue;

/// Expand every non-empty parameter into `(key, value)` query pairs.
///
/// Scalar lists are comma-joined under their own key; record lists become
/// one `name[i].field` pair per field of every record.
pub fn flatten_params(params: &BTreeMap<String, ParamValue>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());

    for (name, value) in params {
        if value.is_empty() {
            continue;
        }
        match value {
            ParamValue::Scalar(scalar) => pairs.push((name.clone(), scalar.clone())),
            ParamValue::List(items) => pairs.push((name.clone(), items.join(","))),
            ParamValue::Records(records) => {
                for (index, record) in records.iter().enumerate() {
                    for (field, field_value) in record {
                        pairs.push((format!("{name}[{index}].{field}"), field_value.clone()));
                    }
                }
            }
        }
    }

    pairs
}
