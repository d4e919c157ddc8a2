use crate::crypto::{hash, Hash};
use crate::data::BufWriter;
use std::collections::BTreeMap;

/// Packages are addressed by the hash of the sources they were compiled from.
pub type PackageId = Hash;

/// Computes the id of a package from its entry files and its sources.
///
/// Entries keep their order; sources are hashed in name order.
pub fn calculate_package_id(entries: &[String], sources: &BTreeMap<String, String>) -> PackageId {
    let mut writer = BufWriter::new();
    writer.write_uleb(entries.len() as u64);
    for entry in entries {
        writer.write_str(entry);
    }
    writer.write_uleb(sources.len() as u64);
    for (name, content) in sources {
        writer.write_str(name);
        writer.write_str(content);
    }
    hash(writer.data())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_id_depends_on_sources() {
        let entries = vec!["index.wat".to_string()];
        let mut sources = BTreeMap::new();
        sources.insert("index.wat".to_string(), "(module)".to_string());
        let id1 = calculate_package_id(&entries, &sources);

        sources.insert("index.wat".to_string(), "(module (memory 1))".to_string());
        let id2 = calculate_package_id(&entries, &sources);

        assert_ne!(id1, id2);
        assert_eq!(id2, calculate_package_id(&entries, &sources));
    }
}
