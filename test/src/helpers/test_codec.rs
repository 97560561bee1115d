use concord_shared::{FrameCodec, SerdeErr, SharedData};

/// Three fields of different types, written and read in the order A, B, C.
/// Every successful decode is appended to `history`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbcCodec {
    pub a: u32,
    pub b: f64,
    pub c: String,
    pub dirty: bool,
    pub history: Vec<(u32, f64, String)>,
}

impl AbcCodec {
    pub fn new(a: u32, b: f64, c: &str) -> Self {
        Self {
            a,
            b,
            c: c.to_string(),
            dirty: true,
            history: Vec::new(),
        }
    }

    pub fn set(&mut self, a: u32, b: f64, c: &str) {
        self.a = a;
        self.b = b;
        self.c = c.to_string();
        self.dirty = true;
    }

    pub fn values(&self) -> (u32, f64, String) {
        (self.a, self.b, self.c.clone())
    }
}

impl FrameCodec for AbcCodec {
    fn encode(&mut self, data: &mut SharedData) {
        data.write(&self.a);
        data.write(&self.b);
        data.write(&self.c);
        self.dirty = false;
    }

    fn decode(&mut self, data: &mut SharedData) -> Result<(), SerdeErr> {
        self.a = data.read()?;
        self.b = data.read()?;
        self.c = data.read()?;
        self.history.push(self.values());
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Writes only A and B of an [`AbcCodec`], one field short of what a client
/// decoding an `AbcCodec` expects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingFieldCodec(pub AbcCodec);

impl FrameCodec for MissingFieldCodec {
    fn encode(&mut self, data: &mut SharedData) {
        data.write(&self.0.a);
        data.write(&self.0.b);
        self.0.dirty = false;
    }

    fn decode(&mut self, data: &mut SharedData) -> Result<(), SerdeErr> {
        self.0.a = data.read()?;
        self.0.b = data.read()?;
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        self.0.is_dirty()
    }
}
