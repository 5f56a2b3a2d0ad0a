//! Protobuf messages of a network snapshot

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PbBuf {
    #[prost(float, repeated, tag = "1")]
    pub vals: ::prost::alloc::vec::Vec<f32>,
    #[prost(int32, repeated, tag = "2")]
    pub shape: ::prost::alloc::vec::Vec<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PbFcLayer {
    #[prost(message, optional, tag = "1")]
    pub weights: ::core::option::Option<PbBuf>,
    #[prost(message, optional, tag = "2")]
    pub bias: ::core::option::Option<PbBuf>,
    #[prost(string, tag = "3")]
    pub activation: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PbSequentialModel {
    #[prost(message, repeated, tag = "1")]
    pub layers: ::prost::alloc::vec::Vec<PbFcLayer>,
    #[prost(float, tag = "2")]
    pub learn_rate: f32,
}
