/// The single transient message surface.
///
/// Every `show` bumps the generation. A clear only lands if it carries the
/// generation of the message currently on screen, so a timer scheduled for an
/// older message can never wipe a newer one.
#[derive(Debug, Default)]
pub struct MessageBar {
    text: Option<String>,
    generation: u64,
}

impl MessageBar {
    /// Replace whatever is shown. Returns the generation to schedule a clear for.
    pub fn show(&mut self, text: impl Into<String>) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.text = Some(text.into());
        self.generation
    }

    /// Returns true if the message was actually removed.
    pub fn clear(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.text.is_none() {
            return false;
        }
        self.text = None;
        true
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}
