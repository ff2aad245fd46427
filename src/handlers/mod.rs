// handlers/mod.rs - route handlers by security tier
//
// public    - no caller credential (/api/auth/login, register, password reset)
// protected - caller credential forwarded to the crew service (/api/*)
// pages     - HTML shells behind the access gate and role guard
pub mod pages;
pub mod protected;
pub mod public;
