use glam::{Mat4, Vec3};

/// Entry point names every stage source must define.
pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Host-visible type of a uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// Stored as a `u32` on the GPU.
    Bool,
    Int,
    Float,
    Vec3,
    Mat4,
}

impl UniformKind {
    /// `(align, size)` in bytes in the uniform address space.
    fn align_and_size(self) -> (u32, u32) {
        match self {
            UniformKind::Bool | UniformKind::Int | UniformKind::Float => (4, 4),
            UniformKind::Vec3 => (16, 12),
            UniformKind::Mat4 => (16, 64),
        }
    }
}

/// Resolved position of a named uniform inside a program's uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation {
    pub offset: u32,
    pub kind: UniformKind,
}

/// A value ready to be written to a uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Bool(_) => UniformKind::Bool,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// Little-endian bytes as laid out in the uniform block.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            UniformValue::Bool(v) => bytemuck::bytes_of(&u32::from(*v)).to_vec(),
            UniformValue::Int(v) => bytemuck::bytes_of(v).to_vec(),
            UniformValue::Float(v) => bytemuck::bytes_of(v).to_vec(),
            UniformValue::Vec3(v) => bytemuck::cast_slice(&v.to_array()).to_vec(),
            UniformValue::Mat4(m) => bytemuck::cast_slice(&m.to_cols_array()).to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct UniformEntry {
    name: String,
    location: UniformLocation,
}

/// Ordered set of named uniforms backing one program, with offsets computed
/// the way WGSL lays out a struct in the uniform address space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformBlock {
    entries: Vec<UniformEntry>,
    size: u32,
}

impl UniformBlock {
    pub fn new<'a>(fields: impl IntoIterator<Item = (&'a str, UniformKind)>) -> Self {
        let mut entries: Vec<UniformEntry> = Vec::new();
        let mut cursor = 0u32;
        for (name, kind) in fields {
            if entries.iter().any(|e| e.name == name) {
                tracing::warn!(uniform = name, "duplicate uniform declaration ignored");
                continue;
            }
            let (align, size) = kind.align_and_size();
            let offset = cursor.next_multiple_of(align);
            cursor = offset + size;
            entries.push(UniformEntry {
                name: name.to_string(),
                location: UniformLocation { offset, kind },
            });
        }
        Self {
            entries,
            size: cursor.next_multiple_of(16),
        }
    }

    /// Looks a uniform up by name. `None` is the "not found" sentinel.
    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.location)
    }

    /// Total block size in bytes, a multiple of 16. Never zero so it can
    /// always back a GPU buffer.
    pub fn size(&self) -> u32 {
        self.size.max(16)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

/// Everything a backend needs to know to link a program besides its stages.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramLayout {
    pub uniforms: UniformBlock,
    /// Whether the fragment stage samples a per-material diffuse texture.
    pub textured: bool,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
}

impl ProgramLayout {
    pub fn new(uniforms: UniformBlock) -> Self {
        Self {
            uniforms,
            textured: false,
            vertex_entry: VERTEX_ENTRY,
            fragment_entry: FRAGMENT_ENTRY,
        }
    }

    pub fn textured(mut self) -> Self {
        self.textured = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_uniform_alignment() {
        let block = UniformBlock::new([
            ("model", UniformKind::Mat4),
            ("view", UniformKind::Mat4),
            ("projection", UniformKind::Mat4),
            ("color", UniformKind::Vec3),
            ("intensity", UniformKind::Float),
            ("lit", UniformKind::Bool),
        ]);
        let off = |n| block.location(n).unwrap().offset;
        assert_eq!(off("model"), 0);
        assert_eq!(off("view"), 64);
        assert_eq!(off("projection"), 128);
        assert_eq!(off("color"), 192);
        // A scalar packs into the tail of a vec3.
        assert_eq!(off("intensity"), 204);
        assert_eq!(off("lit"), 208);
        assert_eq!(block.size(), 224);
    }

    #[test]
    fn vec3_after_scalar_is_realigned() {
        let block = UniformBlock::new([("count", UniformKind::Int), ("tint", UniformKind::Vec3)]);
        assert_eq!(block.location("tint").unwrap().offset, 16);
        assert_eq!(block.size(), 32);
    }

    #[test]
    fn unknown_name_is_none() {
        let block = UniformBlock::new([("model", UniformKind::Mat4)]);
        assert_eq!(block.location("modle"), None);
    }

    #[test]
    fn duplicates_keep_first_declaration() {
        let block = UniformBlock::new([("a", UniformKind::Float), ("a", UniformKind::Mat4)]);
        assert_eq!(block.len(), 1);
        assert_eq!(block.location("a").unwrap().kind, UniformKind::Float);
    }

    #[test]
    fn empty_block_still_has_size() {
        assert_eq!(UniformBlock::default().size(), 16);
    }

    #[test]
    fn value_bytes_match_kind_size() {
        assert_eq!(UniformValue::Bool(true).to_bytes(), 1u32.to_le_bytes());
        assert_eq!(UniformValue::Int(-2).to_bytes().len(), 4);
        assert_eq!(UniformValue::Vec3(Vec3::ONE).to_bytes().len(), 12);
        let m = UniformValue::Mat4(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        let bytes = m.to_bytes();
        assert_eq!(bytes.len(), 64);
        // Column-major: translation lives in the last column.
        let expected: Vec<u8> = [1.0f32, 2.0, 3.0]
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect();
        assert_eq!(&bytes[48..60], &expected[..]);
    }
}
