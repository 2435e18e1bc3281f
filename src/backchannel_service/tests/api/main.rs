mod backchannel_logout;
mod filter;
mod health;
mod helpers;
mod jwks;
