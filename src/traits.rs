/// Anything that can be evaluated at a point in world (scanner) space, in millimetres.
pub trait WorldSampler {
    fn sample_world(&self, world: [f64; 3]) -> f64;
}
