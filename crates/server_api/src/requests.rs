/// Solution names learners asked for, oldest first. Names are unique.
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    pending: Vec<String>,
}

impl RequestQueue {
    pub fn enqueue(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.pending.push(name);
        true
    }

    pub fn dequeue(&mut self, name: &str) -> bool {
        let Some(index) = self.pending.iter().position(|pending| pending == name) else {
            return false;
        };
        self.pending.remove(index);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pending.iter().any(|pending| pending == name)
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.pending.clone()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
