/// Accumulated output of the current stream, kept as the fragments in the
/// order they arrived.
#[derive(Debug, Default, Clone)]
pub struct DisplayBuffer {
    fragments: Vec<String>,
    text: String,
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, fragment: &str) {
        self.text.push_str(fragment);
        self.fragments.push(fragment.to_string());
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
        self.text.clear();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
