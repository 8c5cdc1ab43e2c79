/// The label-address map built by pass 1: an ordered sequence of
/// `(label, byte address)` pairs. Labels are unique; the first
/// definition wins and redefinition is reported by the caller.
#[derive(Debug, Default)]
pub struct SymbolTable(Vec<(String, u32)>);

impl SymbolTable {
    /// Records a label. Returns `false` if the label already exists (the
    /// existing entry is kept).
    pub fn define(&mut self, label: String, address: u32) -> bool {
        if self.lookup(&label).is_some() {
            return false;
        }
        self.0.push((label, address));
        true
    }

    #[must_use]
    pub fn lookup(&self, label: &str) -> Option<u32> {
        self.0
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, address)| *address)
    }
}
