//! Column-name and encoding-field sanitization.

use crate::options::COLUMN_NAME_REPLACEMENTS;
use crate::pipeline::Leaf;
use crate::Result;

/// Replace characters the renderer cannot handle in table column names, and
/// apply the same substitutions to every defined encoding field so columns
/// and field references stay addressable to each other.
pub fn sanitize_columns(leaves: &mut [Leaf<'_>]) -> Result<()> {
    for leaf in leaves.iter_mut() {
        let table = leaf.table()?.clone();
        {
            let mut frame = table.borrow_mut();
            for &(prohibited, replacement) in COLUMN_NAME_REPLACEMENTS {
                let renames: Vec<(String, String)> = frame
                    .get_column_names_str()
                    .iter()
                    .filter(|name| name.contains(prohibited))
                    .map(|name| (name.to_string(), name.replace(prohibited, replacement)))
                    .collect();
                for (old, new) in renames {
                    frame.rename(&old, new.into())?;
                }
            }
        }

        if let Some(encoding) = leaf.node.encoding.value_mut() {
            for spec in encoding.field_specs_mut() {
                if let Some(field) = spec.field.value_mut() {
                    for &(prohibited, replacement) in COLUMN_NAME_REPLACEMENTS {
                        if field.contains(prohibited) {
                            *field = field.replace(prohibited, replacement);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
