/// Destination for the text written by `print` statements.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}

impl<C: SystemContext + ?Sized> SystemContext for &mut C {
    fn writeln(&mut self, text: &str) {
        (**self).writeln(text)
    }
}

pub struct StdioContext;

impl SystemContext for StdioContext {
    fn writeln(&mut self, text: &str) {
        println!("{text}");
    }
}

#[derive(Debug, Default)]
pub struct BufferedContext {
    buffer: String,
}

impl BufferedContext {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_data(self) -> String {
        self.buffer
    }
}

impl SystemContext for BufferedContext {
    fn writeln(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}
