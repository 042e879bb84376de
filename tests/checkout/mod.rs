mod dirty_working_tree_blocks_checkout;
