/// Something that picks an action for an observed state.
pub trait Player<S> {
    type Action;

    fn choose_action(&mut self, state: &S) -> Self::Action;
}
