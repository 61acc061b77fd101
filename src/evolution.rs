use serde::{Deserialize, Serialize};

use crate::api::id_from_url;
use crate::state::NamedRef;

/// Node of an evolution tree, rooted at the base form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionNode {
    pub species: NamedRef,
    pub evolves_to: Vec<EvolutionNode>,
}

impl EvolutionNode {
    pub fn id(&self) -> u32 {
        id_from_url(&self.species.url)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionToken {
    Step { id: u32, name: String },
    Separator,
}

/// Pre-order walk of the tree, with a separator before every non-root node.
///
/// Branches are laid out one after another: the first child's whole subtree is
/// emitted before the second child starts, so sibling grouping is not visible in
/// the output.
pub fn flatten(root: &EvolutionNode) -> Vec<EvolutionToken> {
    let mut tokens = Vec::new();
    push_node(root, &mut tokens);
    tokens
}

fn push_node(node: &EvolutionNode, tokens: &mut Vec<EvolutionToken>) {
    tokens.push(EvolutionToken::Step {
        id: node.id(),
        name: node.species.name.clone(),
    });
    for child in &node.evolves_to {
        tokens.push(EvolutionToken::Separator);
        push_node(child, tokens);
    }
}

/// The step tokens only, as `(id, name)` in display order.
pub fn steps(tokens: &[EvolutionToken]) -> Vec<(u32, &str)> {
    tokens
        .iter()
        .filter_map(|token| match token {
            EvolutionToken::Step { id, name } => Some((*id, name.as_str())),
            EvolutionToken::Separator => None,
        })
        .collect()
}
