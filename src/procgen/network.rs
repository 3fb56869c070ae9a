//! Distribution-network topology shared by the layout builder and the flow
//! animator.
//!
//! Nodes are sources and sinks (river, garden, wells, powerhouse, solar
//! panels, buildings); edges carry the resource kind plus the world-space
//! endpoints the flow particles travel between. The water trunk (river to
//! garden) is tracked separately because it is the only edge that carries the
//! arced surface stream.

use bevy::prelude::*;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use petgraph::visit::EdgeRef;

/// Which resource an edge carries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlowKind {
    Water,
    Energy,
}

#[derive(Clone, Copy, Debug)]
pub enum NodeKind {
    River,
    Garden,
    Well(usize),
    Powerhouse,
    Solar(usize),
    Building(usize),
}

#[derive(Clone, Copy, Debug)]
pub struct NetworkNode {
    pub kind: NodeKind,
    pub position: Vec3,
}

/// One directed supply run with the endpoints particles animate between.
#[derive(Clone, Copy, Debug)]
pub struct FlowEdge {
    pub kind: FlowKind,
    pub start: Vec3,
    pub end: Vec3,
}

#[derive(Resource, Default)]
pub struct FlowNetwork {
    pub graph: Graph<NetworkNode, FlowEdge>,
    water_trunk: Option<EdgeIndex>,
}

impl FlowNetwork {
    pub fn add_node(&mut self, kind: NodeKind, position: Vec3) -> NodeIndex {
        self.graph.add_node(NetworkNode { kind, position })
    }

    pub fn connect(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        kind: FlowKind,
        start: Vec3,
        end: Vec3,
    ) -> EdgeIndex {
        self.graph.add_edge(from, to, FlowEdge { kind, start, end })
    }

    /// Register the river-to-garden trunk run.
    pub fn set_trunk(&mut self, edge: EdgeIndex) {
        self.water_trunk = Some(edge);
    }

    pub fn trunk(&self) -> Option<&FlowEdge> {
        self.water_trunk.and_then(|edge| self.graph.edge_weight(edge))
    }

    /// Edges of one kind in insertion order.
    pub fn edges_of_kind(&self, kind: FlowKind) -> impl Iterator<Item = &FlowEdge> {
        self.graph
            .edge_references()
            .map(|edge| edge.weight())
            .filter(move |edge| edge.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_filter_by_kind() {
        let mut network = FlowNetwork::default();
        let river = network.add_node(NodeKind::River, Vec3::ZERO);
        let garden = network.add_node(NodeKind::Garden, Vec3::X);
        let powerhouse = network.add_node(NodeKind::Powerhouse, Vec3::Z);
        let building = network.add_node(NodeKind::Building(0), Vec3::Y);

        let trunk = network.connect(river, garden, FlowKind::Water, Vec3::ZERO, Vec3::X);
        network.set_trunk(trunk);
        network.connect(powerhouse, building, FlowKind::Energy, Vec3::Z, Vec3::Y);
        network.connect(powerhouse, building, FlowKind::Energy, Vec3::Z, Vec3::Y);

        assert_eq!(network.edges_of_kind(FlowKind::Water).count(), 1);
        assert_eq!(network.edges_of_kind(FlowKind::Energy).count(), 2);

        let trunk = network.trunk().unwrap();
        assert_eq!(trunk.start, Vec3::ZERO);
        assert_eq!(trunk.end, Vec3::X);
    }

    #[test]
    fn nodes_keep_their_anchors() {
        let mut network = FlowNetwork::default();
        let well = network.add_node(NodeKind::Well(2), Vec3::new(30.0, 0.0, -150.0));
        assert_eq!(network.graph[well].position, Vec3::new(30.0, 0.0, -150.0));
        assert!(matches!(network.graph[well].kind, NodeKind::Well(2)));
    }
}
