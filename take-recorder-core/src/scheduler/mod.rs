pub mod auto_cycle;
