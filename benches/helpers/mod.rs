#![allow(dead_code)]

pub mod workflow_builders;
