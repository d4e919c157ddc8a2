use crate::types::*;

/// Identity and lock of a jig, as seen from another container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JigData {
    pub origin: Pointer,
    pub location: Pointer,
    pub class_ptr: Pointer,
    pub lock: Lock,
}

impl JigData {
    pub fn from_output(output: &Output) -> Self {
        Self {
            origin: output.origin,
            location: output.location,
            class_ptr: output.class_ptr,
            lock: output.lock.clone(),
        }
    }

    /// Wire form of the `Output` object alone.
    pub fn output_bytes(&self) -> Vec<u8> {
        let mut writer = BufWriter::new();
        writer
            .write_bytes(&self.origin.to_bytes())
            .write_bytes(&self.location.to_bytes())
            .write_bytes(&self.class_ptr.to_bytes());
        writer.into_bytes()
    }

    /// Writes the `$output` and `$lock` fields of a jig in their wire form.
    pub fn write(&self, writer: &mut BufWriter) {
        writer
            .write_bytes(&self.origin.to_bytes())
            .write_bytes(&self.location.to_bytes())
            .write_bytes(&self.class_ptr.to_bytes());
        writer
            .write_bytes(&self.origin.to_bytes())
            .write_i32(self.lock.lock_type.as_i32())
            .write_bytes(&self.lock.data);
    }
}

/// The wire form of a `*Class` value: the jig data followed by the persisted state.
pub fn hydration_bytes(output: &Output) -> Vec<u8> {
    let mut writer = BufWriter::new();
    JigData::from_output(output).write(&mut writer);
    writer.write_fixed_bytes(&output.state);
    writer.into_bytes()
}
