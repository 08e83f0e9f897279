// src/application/services/mod.rs
pub mod bookmark_service;
pub mod bookmark_service_impl;
