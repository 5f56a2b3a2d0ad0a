use rand::RngCore;

use crate::dataloader::example::Example;

pub trait DataLoader {
    /// Next example, wraps around to the first one after the last
    fn next(&self) -> &Example;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn reset(&mut self) {}
    fn pos(&self) -> Option<usize> {
        None
    }

    /// Reorders the examples, loaders with a fixed order may ignore it
    fn shuffle(&mut self, _rng: &mut dyn RngCore) {}
}
