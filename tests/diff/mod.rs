mod show_unified_diff_output;
