// SPDX-License-Identifier: Apache-2.0

use serde_json::Value;

use crate::VerificationMismatch;

/// Collect every property defined in `desire` but holding different value in
/// `current`. Properties set to `null` in `desire` are ignored.
pub(crate) fn get_json_value_difference(
    reference: String,
    desire: &Value,
    current: &Value,
    mismatches: &mut Vec<VerificationMismatch>,
) {
    match (desire, current) {
        (Value::Null, _) => (),
        (Value::Bool(des), Value::Bool(cur)) => {
            if des != cur {
                push(reference, desire, current, mismatches);
            }
        }
        (Value::Number(des), Value::Number(cur)) => {
            if des != cur {
                push(reference, desire, current, mismatches);
            }
        }
        (Value::String(des), Value::String(cur)) => {
            if des != cur {
                push(reference, desire, current, mismatches);
            }
        }
        (Value::Array(des), Value::Array(cur)) => {
            if des.len() != cur.len() {
                push(reference, desire, current, mismatches);
            } else {
                for (index, (des_element, cur_element)) in
                    des.iter().zip(cur.iter()).enumerate()
                {
                    get_json_value_difference(
                        format!("{reference}[{index}]"),
                        des_element,
                        cur_element,
                        mismatches,
                    );
                }
            }
        }
        (Value::Object(des), Value::Object(cur)) => {
            for (key, des_value) in des.iter() {
                let reference = if reference.is_empty() {
                    key.to_string()
                } else {
                    format!("{reference}.{key}")
                };
                if let Some(cur_value) = cur.get(key) {
                    get_json_value_difference(
                        reference, des_value, cur_value, mismatches,
                    );
                } else if des_value != &Value::Null {
                    push(reference, des_value, &Value::Null, mismatches);
                }
            }
        }
        (_, _) => push(reference, desire, current, mismatches),
    }
}

fn push(
    reference: String,
    desire: &Value,
    current: &Value,
    mismatches: &mut Vec<VerificationMismatch>,
) {
    mismatches.push(VerificationMismatch::new(
        reference,
        desire.clone(),
        current.clone(),
    ));
}

/// Properties of `desired` which differ from `current`, `None` if
/// nothing changed.
pub(crate) fn gen_diff_json_value(
    desired: &Value,
    current: &Value,
) -> Option<Value> {
    match desired {
        Value::Object(des_obj) => {
            if let Some(cur_obj) = current.as_object() {
                let mut diff_map = serde_json::Map::new();
                for (des_key, des_value) in des_obj.iter() {
                    if let Some(cur_value) = cur_obj.get(des_key) {
                        if let Some(ret) =
                            gen_diff_json_value(des_value, cur_value)
                        {
                            diff_map.insert(des_key.clone(), ret);
                        }
                    } else {
                        diff_map.insert(des_key.clone(), des_value.clone());
                    }
                }
                if diff_map.is_empty() {
                    None
                } else {
                    Some(Value::Object(diff_map))
                }
            } else {
                Some(desired.clone())
            }
        }
        _ => {
            if desired != current {
                Some(desired.clone())
            } else {
                None
            }
        }
    }
}
