use super::GenerationRequest;

#[derive(Debug)]
pub enum Action {
    BackendHealthCheck(),
    BackendRequest(GenerationRequest),
}
