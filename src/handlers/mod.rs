pub mod messages;
pub mod recv_routing;
