pub mod cartpole;

pub use cartpole::CartPole;

/// Dispatch to the correct environment type based on `env_name`.
/// Uses compile-time monomorphization for zero runtime overhead.
///
/// Usage:
/// ```ignore
/// dispatch_env!(config.env, {
///     // Type E is now CartPole
///     run_something::<E>()
/// });
/// ```
#[macro_export]
macro_rules! dispatch_env {
    ($env_name:expr, $callback:expr) => {{
        let name: &str = $env_name.as_str();
        match name {
            "cartpole" => {
                type E = $crate::envs::CartPole;
                $callback
            }
            _ => {
                anyhow::bail!("Unknown environment: '{}'. Supported: cartpole", name)
            }
        }
    }};
}
