use foldhash::{HashMap, HashMapExt};

use crate::header::PropertyDef;
use crate::reader::ScalarType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyLocation {
    pub offset: usize,
    pub ty: ScalarType,
    pub size: usize,
}

/// Byte layout of one fixed-size vertex record.
#[derive(Debug, Clone)]
pub struct PropertyLayout {
    offsets: HashMap<String, PropertyLocation>,
    record_size: usize,
}

impl PropertyLayout {
    pub fn new(properties: &[PropertyDef]) -> Self {
        let mut offsets = HashMap::with_capacity(properties.len());
        let mut record_size = 0;
        for p in properties {
            let size = p.ty.size_bytes();
            offsets.insert(
                p.name.clone(),
                PropertyLocation {
                    offset: record_size,
                    ty: p.ty.clone(),
                    size,
                },
            );
            record_size += size;
        }
        Self {
            offsets,
            record_size,
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyLocation> {
        self.offsets.get(name)
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str, ty: &str) -> PropertyDef {
        PropertyDef {
            name: name.to_string(),
            ty: ScalarType::parse(ty),
        }
    }

    #[test]
    fn offsets_accumulate_in_declaration_order() {
        let layout = PropertyLayout::new(&[
            prop("x", "float"),
            prop("red", "uchar"),
            prop("nx", "double"),
            prop("id", "ushort"),
            prop("weird", "float16"),
        ]);
        assert_eq!(layout.len(), 5);
        assert_eq!(layout.get("x").unwrap().offset, 0);
        assert_eq!(layout.get("red").unwrap().offset, 4);
        assert_eq!(layout.get("nx").unwrap().offset, 5);
        assert_eq!(layout.get("nx").unwrap().size, 8);
        assert_eq!(layout.get("id").unwrap().offset, 13);
        assert_eq!(layout.get("weird").unwrap().offset, 15);
        assert_eq!(layout.record_size(), 19);
        assert!(layout.get("y").is_none());
    }

    #[test]
    fn empty_layout() {
        let layout = PropertyLayout::new(&[]);
        assert!(layout.is_empty());
        assert_eq!(layout.record_size(), 0);
    }
}
