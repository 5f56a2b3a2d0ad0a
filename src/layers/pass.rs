use crate::util::DataVec;

/// Everything a layer needs from one forward call to back-propagate it.
/// Produced by `FcLayer::feed_forward`, consumed by `FcLayer::back_propagate`.
#[derive(Clone, Debug)]
pub struct LayerPass {
    pub input: DataVec,
    pub pre_activation: DataVec,
    pub output: DataVec,
}

/// Error signal of one layer for one example, ready for the weight update.
/// Produced by `FcLayer::back_propagate`, consumed by `FcLayer::update`.
#[derive(Clone, Debug)]
pub struct LayerGrad {
    pub input: DataVec,
    pub delta: DataVec,
}
